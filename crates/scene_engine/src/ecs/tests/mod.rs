//! Cross-module tests for the entity store, hierarchy and transforms
