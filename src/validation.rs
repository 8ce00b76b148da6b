const MAX_USERNAME_LEN: usize = 32;
const MAX_COURSE_CODE_LEN: usize = 16;
const MAX_NAME_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 2000;

fn validate_identifier(
    value: &str,
    entity: &str,
    max_len: usize,
    allow_period: bool,
) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{entity} cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(format!("{entity} cannot exceed {max_len} characters"));
    }
    let valid = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_period && c == '.');
    if !value.chars().all(valid) {
        let mut allowed = "letters, digits, hyphens, and underscores".to_string();
        if allow_period {
            allowed.push_str(", and periods");
        }
        return Err(format!("{entity} can only contain {allowed}"));
    }
    Ok(())
}

fn validate_text(value: &str, entity: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{entity} cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(format!("{entity} cannot exceed {max_len} characters"));
    }
    Ok(())
}

pub fn validate_username(name: &str) -> Result<(), String> {
    validate_identifier(name, "Username", MAX_USERNAME_LEN, true)
}

pub fn validate_course_code(code: &str) -> Result<(), String> {
    validate_identifier(code, "Course code", MAX_COURSE_CODE_LEN, false)
}

pub fn validate_course_name(name: &str) -> Result<(), String> {
    validate_text(name, "Course name", MAX_NAME_LEN)
}

pub fn validate_full_name(name: &str) -> Result<(), String> {
    validate_text(name, "Full name", MAX_NAME_LEN)
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    Ok(())
}

pub fn validate_message_text(text: &str) -> Result<(), String> {
    validate_text(text, "Message", MAX_MESSAGE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("stu1").is_ok());
        assert!(validate_username("prof.a-b_c").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_course_code_rules() {
        assert!(validate_course_code("CS101").is_ok());
        assert!(validate_course_code("SOE-505").is_ok());
        assert!(validate_course_code("CS.101").is_err());
        assert!(validate_course_code("").is_err());
    }

    #[test]
    fn test_message_text_rejects_blank() {
        assert!(validate_message_text("hello").is_ok());
        assert_eq!(
            validate_message_text("   \n\t").unwrap_err(),
            "Message cannot be empty"
        );
        assert!(validate_message_text(&"a".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }

    #[test]
    fn test_names_and_password() {
        assert!(validate_course_name("Intro to Programming").is_ok());
        assert!(validate_course_name(" ").is_err());
        assert!(validate_full_name("Professor Smith").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(" ").is_ok());
    }
}
