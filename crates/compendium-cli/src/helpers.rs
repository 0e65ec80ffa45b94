use crate::OutputMode;
use compendium_core::canonical;
use serde_json::Value;

pub(crate) fn emit_ok(output_mode: OutputMode, payload: Value) -> Result<(), String> {
    if output_mode.json {
        let bytes = canonical::stable_json_bytes(&payload).map_err(|e| e.to_string())?;
        let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}

pub(crate) fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::env_bool;

    #[test]
    fn unset_flag_uses_default() {
        assert!(env_bool("COMPENDIUM_TEST_FLAG_THAT_IS_NEVER_SET", true));
        assert!(!env_bool("COMPENDIUM_TEST_FLAG_THAT_IS_NEVER_SET", false));
    }
}
