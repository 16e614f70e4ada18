// src/common/validation.rs

use validator::ValidationError;

// Texto obrigatório: só espaços conta como vazio.
// Sem mensagem, os detalhes do erro trazem o código "required".
pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_blank() {
        for val in ["", "   ", "\t", "\n \r"] {
            assert_eq!(validate_not_blank(val).unwrap_err().code, "required");
        }
    }

    #[test]
    fn text_with_padding_is_fine() {
        assert!(validate_not_blank(" Ana ").is_ok());
    }
}
