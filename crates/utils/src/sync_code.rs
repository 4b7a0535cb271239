//! Portable text form of the whole month collection, used to move data
//! between devices by copy and paste: standard base64 over the JSON array.
//!
//! Codes are written as UTF-8. Codes produced by the browser app carry
//! Latin-1 bytes (`Março` as a single `0xE7`), so payloads that are not
//! valid UTF-8 are read as Latin-1.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use models::MonthData;
use thiserror::Error;

use crate::months::{months_from_value, SchemaError};

#[derive(Debug, Error)]
pub enum SyncCodeError {
    #[error("sync code is empty")]
    Empty,

    #[error("sync code is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("sync code does not contain valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub fn encode_sync_code(months: &[MonthData]) -> Result<String, SyncCodeError> {
    let json = serde_json::to_string(months)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes a pasted sync code. Surrounding whitespace (and line breaks
/// introduced by chat apps) is ignored.
pub fn decode_sync_code(code: &str) -> Result<Vec<MonthData>, SyncCodeError> {
    let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(SyncCodeError::Empty);
    }

    let bytes = STANDARD.decode(compact.as_bytes())?;
    let text = String::from_utf8(bytes).unwrap_or_else(|err| latin1_to_string(err.as_bytes()));
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Ok(months_from_value(value)?)
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::MonthName;

    #[test]
    fn test_code_restores_records() {
        let months = vec![
            MonthData::new(MonthName::Marco, 2025, 10000.0, 35.0).with_expense("Limpeza", 1500.0),
            MonthData::new(MonthName::Abril, 2025, 5000.0, 20.0),
        ];

        let code = encode_sync_code(&months).unwrap();
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c)));
        assert_eq!(decode_sync_code(&code).unwrap(), months);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let code = encode_sync_code(&[MonthData::new(MonthName::Maio, 2024, 1.0, 0.0)]).unwrap();
        let (head, tail) = code.split_at(code.len() / 2);
        let pasted = format!("  {head}\n{tail}\n");
        assert_eq!(decode_sync_code(&pasted).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_collection() {
        let code = encode_sync_code(&[]).unwrap();
        assert_eq!(code, "W10=");
        assert!(decode_sync_code(&code).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_blank_input() {
        assert!(matches!(decode_sync_code("   "), Err(SyncCodeError::Empty)));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(decode_sync_code("não é base64!"), Err(SyncCodeError::Encoding(_))));
    }

    #[test]
    fn test_latin1_code_from_browser_is_accepted() {
        let mut payload = br#"[{"id":"1","month":"Mar"#.to_vec();
        payload.push(0xE7);
        payload.extend_from_slice(br#"o","year":2025,"revenue":3000,"expenses":[{"id":"1-1","description":"G"#);
        payload.push(0xE1);
        payload.extend_from_slice(br#"s","amount":80}],"adminFeePercent":35,"partnersCount":1,"createdAt":1}]"#);

        let months = decode_sync_code(&STANDARD.encode(&payload)).unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, MonthName::Marco);
        assert_eq!(months[0].expenses[0].description, "Gás");
    }

    #[test]
    fn test_rejects_repeated_ids() {
        let record = MonthData::new(MonthName::Junho, 2025, 1.0, 0.0);
        let code = encode_sync_code(&[record.clone(), record]).unwrap();
        assert!(matches!(
            decode_sync_code(&code),
            Err(SyncCodeError::Schema(SchemaError::DuplicateId(_)))
        ));
    }

    #[test]
    fn test_rejects_non_json_payload() {
        let code = STANDARD.encode("hello");
        assert!(matches!(decode_sync_code(&code), Err(SyncCodeError::Json(_))));
    }

    #[test]
    fn test_rejects_non_array_payload() {
        let code = STANDARD.encode(r#"{"id":"1"}"#);
        assert!(matches!(
            decode_sync_code(&code),
            Err(SyncCodeError::Schema(SchemaError::NotAnArray(_)))
        ));
    }

    #[test]
    fn test_rejects_malformed_record() {
        let code = STANDARD.encode(r#"[{"id":"1","month":"Janeiro"}]"#);
        assert!(matches!(
            decode_sync_code(&code),
            Err(SyncCodeError::Schema(SchemaError::InvalidRecord { index: 0, .. }))
        ));
    }
}
