use hp_core::HoneyPotError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> HoneyPotError {
    HoneyPotError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: HoneyPotError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_tui_io(error: std::io::Error) -> HoneyPotError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> HoneyPotError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_script_read(error: std::io::Error) -> HoneyPotError {
    map_error("CLI_SCRIPT_READ", error)
}

pub(crate) fn map_cli_options_read(error: std::io::Error) -> HoneyPotError {
    map_error("CLI_OPTIONS_READ", error)
}

pub(crate) fn map_cli_log_open(error: std::io::Error) -> HoneyPotError {
    map_error("CLI_LOG_OPEN", error)
}

pub(crate) fn map_cli_output(error: serde_json::Error) -> HoneyPotError {
    map_error("CLI_OUTPUT", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(HoneyPotError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(map_tui_io(std::io::Error::other("io")).code, "TUI_IO");
        assert_eq!(
            map_cli_state_read(std::io::Error::other("read")).code,
            "CLI_STATE_READ"
        );
        assert_eq!(
            map_cli_script_read(std::io::Error::other("read")).code,
            "CLI_SCRIPT_READ"
        );
        assert_eq!(
            map_cli_options_read(std::io::Error::other("read")).code,
            "CLI_OPTIONS_READ"
        );
        assert_eq!(
            map_cli_log_open(std::io::Error::other("open")).code,
            "CLI_LOG_OPEN"
        );
        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_output(invalid).code, "CLI_OUTPUT");
    }
}
