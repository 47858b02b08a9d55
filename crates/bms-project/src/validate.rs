//! Diagram validation logic.

use std::collections::HashSet;

use crate::schema::{Diagram, LATEST_VERSION};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Structural checks. Block parameters are checked again when the blocks
/// are constructed in [`crate::compile_system`].
pub fn validate_diagram(diagram: &Diagram) -> Result<(), ValidationError> {
    if diagram.version == 0 || diagram.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: diagram.version,
        });
    }
    if !diagram.total_time.is_finite() || diagram.total_time <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "total_time".to_string(),
            value: diagram.total_time.to_string(),
            reason: "must be finite and positive".to_string(),
        });
    }
    if diagram.steps == 0 {
        return Err(ValidationError::InvalidValue {
            field: "steps".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let mut produced = HashSet::new();
    for signal in &diagram.signals {
        if signal.name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "signals.name".to_string(),
                value: format!("{:?}", signal.name),
                reason: "must not be empty".to_string(),
            });
        }
        if !produced.insert(signal.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: signal.name.clone(),
                context: "signals".to_string(),
            });
        }
    }

    for (pos, block) in diagram.blocks.iter().enumerate() {
        if !produced.contains(block.input()) {
            return Err(ValidationError::MissingReference {
                id: block.input().to_string(),
                context: format!(
                    "input of block {pos} ({}); inputs must be a signal or an earlier block output",
                    block.kind_name()
                ),
            });
        }
        if block.output().trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("blocks[{pos}].output"),
                value: format!("{:?}", block.output()),
                reason: "must not be empty".to_string(),
            });
        }
        if !produced.insert(block.output()) {
            return Err(ValidationError::DuplicateId {
                id: block.output().to_string(),
                context: format!("output of block {pos} ({})", block.kind_name()),
            });
        }
    }

    Ok(())
}
