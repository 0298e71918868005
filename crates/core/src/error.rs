#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = CoreError::NotFound {
            entity: "resource",
            id: "widgets".to_string(),
        };
        assert_eq!(err.to_string(), "Entity not found: resource with id widgets");
    }

    #[test]
    fn display_validation() {
        let err = CoreError::Validation("path must start with '/'".to_string());
        assert_eq!(
            err.to_string(),
            "Validation failed: path must start with '/'"
        );
    }
}
