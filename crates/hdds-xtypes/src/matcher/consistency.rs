// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeConsistencyEnforcement QoS policy (DDS-XTypes v1.3, 7.6.3.4).

/// Relaxations applied by the assignability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConsistencyEnforcement {
    /// Skip member name / id consistency checks.
    pub ignore_member_names: bool,
    /// Accept any string bound.
    pub ignore_string_bounds: bool,
    /// Accept any sequence and map bound.
    pub ignore_sequence_bounds: bool,
    /// Reject writers carrying members the reader lacks.
    pub prevent_type_widening: bool,
    /// Require type information on both sides to match.
    pub force_type_validation: bool,
}

impl Default for TypeConsistencyEnforcement {
    fn default() -> Self {
        Self {
            ignore_member_names: false,
            ignore_string_bounds: true,
            ignore_sequence_bounds: true,
            prevent_type_widening: false,
            force_type_validation: false,
        }
    }
}

impl TypeConsistencyEnforcement {
    /// Every relaxation off.
    pub fn strict() -> Self {
        Self {
            ignore_member_names: false,
            ignore_string_bounds: false,
            ignore_sequence_bounds: false,
            prevent_type_widening: true,
            force_type_validation: true,
        }
    }

    pub fn with_ignore_member_names(mut self, on: bool) -> Self {
        self.ignore_member_names = on;
        self
    }

    pub fn with_ignore_string_bounds(mut self, on: bool) -> Self {
        self.ignore_string_bounds = on;
        self
    }

    pub fn with_ignore_sequence_bounds(mut self, on: bool) -> Self {
        self.ignore_sequence_bounds = on;
        self
    }

    pub fn with_prevent_type_widening(mut self, on: bool) -> Self {
        self.prevent_type_widening = on;
        self
    }

    pub fn with_force_type_validation(mut self, on: bool) -> Self {
        self.force_type_validation = on;
        self
    }

    /// Reader bound `reader` accepts writer bound `writer` (0 = unbounded).
    pub(crate) fn bound_fits(reader: u32, writer: u32) -> bool {
        reader == 0 || (writer != 0 && reader >= writer)
    }
}
