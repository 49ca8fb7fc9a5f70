//! Tabular input/output
//!
//! CSV reading for uploaded sheets and CSV writing for exports, plus the
//! fuzzy column resolver. Sheets arrive from many hands, so column matching
//! is a case-insensitive substring test against a keyword ("cep",
//! "proposta"), never an exact header comparison.

use thiserror::Error;

use crate::store::ResultRecord;

/// Result type alias for sheet operations
pub type Result<T> = std::result::Result<T, SheetError>;

/// Keyword that locates the postal-code column.
pub const CEP_COLUMN_KEYWORD: &str = "cep";

/// Keyword that locates the row-identifier column.
pub const IDENTIFIER_COLUMN_KEYWORD: &str = "proposta";

/// Output headers, in the business vocabulary downstream tooling expects.
const EXPORT_HEADERS: [&str; 7] = [
    "PROPOSTA", "CEP", "ENDEREÇO", "BAIRRO", "CIDADE", "ESTADO", "STATUS",
];

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("No column containing '{keyword}' found in the sheet header")]
    MissingColumn { keyword: String },

    #[error("The sheet has no data rows")]
    Empty,

    #[error("Failed to parse sheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolved columns and row count of an uploaded sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub cep_column: String,
    pub identifier_column: String,
    pub total_records: i64,
}

/// One input row, reduced to the two columns the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub identifier: Option<String>,
    /// Postal code cell text exactly as uploaded
    pub cep_raw: String,
}

/// First header whose lowercased text contains the lowercased keyword.
pub fn find_column(headers: &[String], keyword: &str) -> Option<String> {
    let keyword = keyword.to_lowercase();
    headers
        .iter()
        .find(|h| h.to_lowercase().contains(&keyword))
        .cloned()
}

/// Parse headers, resolve both required columns, and count data rows.
///
/// A missing column or an empty sheet is a hard input-validation error; job
/// creation aborts with a message naming the missing keyword.
pub fn inspect(bytes: &[u8]) -> Result<SheetInfo> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let cep_column =
        find_column(&headers, CEP_COLUMN_KEYWORD).ok_or_else(|| SheetError::MissingColumn {
            keyword: CEP_COLUMN_KEYWORD.to_string(),
        })?;
    let identifier_column = find_column(&headers, IDENTIFIER_COLUMN_KEYWORD).ok_or_else(|| {
        SheetError::MissingColumn {
            keyword: IDENTIFIER_COLUMN_KEYWORD.to_string(),
        }
    })?;

    let mut total_records: i64 = 0;
    for record in reader.records() {
        record?;
        total_records += 1;
    }

    if total_records == 0 {
        return Err(SheetError::Empty);
    }

    Ok(SheetInfo {
        cep_column,
        identifier_column,
        total_records,
    })
}

/// Extract `{identifier, cep_raw}` per data row, preserving input order.
pub fn read_rows(bytes: &[u8], cep_column: &str, identifier_column: &str) -> Result<Vec<InputRow>> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let cep_idx = headers
        .iter()
        .position(|h| h == cep_column)
        .ok_or_else(|| SheetError::MissingColumn {
            keyword: cep_column.to_string(),
        })?;
    let identifier_idx = headers.iter().position(|h| h == identifier_column);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cep_raw = record.get(cep_idx).unwrap_or("").to_string();
        let identifier = identifier_idx
            .and_then(|i| record.get(i))
            .map(str::to_string)
            .filter(|s| !s.is_empty());
        rows.push(InputRow { identifier, cep_raw });
    }

    Ok(rows)
}

/// Serialize result records to the export CSV, one row per input row.
pub fn write_results_csv(records: &[ResultRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS)?;
    for record in records {
        writer.write_record([
            record.identifier.as_deref().unwrap_or(""),
            &record.cep,
            record.street.as_deref().unwrap_or(""),
            record.neighborhood.as_deref().unwrap_or(""),
            record.city.as_deref().unwrap_or(""),
            record.state.as_deref().unwrap_or(""),
            &record.status,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| SheetError::Io(std::io::Error::other(e)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SHEET: &[u8] = b"Nr Proposta,Nome,CEP Cliente\nP1,Ana,01001-000\nP2,Bruno,00000000\n";

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_column_is_case_insensitive_substring() {
        let headers = headers(&["Nr Proposta", "Nome", "CEP Cliente"]);
        assert_eq!(
            find_column(&headers, "cep"),
            Some("CEP Cliente".to_string())
        );
        assert_eq!(
            find_column(&headers, "PROPOSTA"),
            Some("Nr Proposta".to_string())
        );
        assert_eq!(find_column(&headers, "endereco"), None);
    }

    #[test]
    fn test_find_column_returns_first_match() {
        let headers = headers(&["cep_antigo", "cep_novo"]);
        assert_eq!(find_column(&headers, "cep"), Some("cep_antigo".to_string()));
    }

    #[test]
    fn test_inspect_resolves_columns_and_counts() {
        let info = inspect(SHEET).unwrap();
        assert_eq!(info.cep_column, "CEP Cliente");
        assert_eq!(info.identifier_column, "Nr Proposta");
        assert_eq!(info.total_records, 2);
    }

    #[test]
    fn test_inspect_names_the_missing_keyword() {
        let err = inspect(b"Nr Proposta,Nome\nP1,Ana\n").unwrap_err();
        match err {
            SheetError::MissingColumn { keyword } => assert_eq!(keyword, "cep"),
            other => panic!("unexpected error: {other}"),
        }

        let err = inspect(b"Nome,CEP\nAna,01001000\n").unwrap_err();
        match err {
            SheetError::MissingColumn { keyword } => assert_eq!(keyword, "proposta"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inspect_rejects_empty_sheet() {
        let err = inspect(b"Proposta,CEP\n").unwrap_err();
        assert!(matches!(err, SheetError::Empty));
    }

    #[test]
    fn test_read_rows_preserves_order_and_raw_text() {
        let rows = read_rows(SHEET, "CEP Cliente", "Nr Proposta").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier.as_deref(), Some("P1"));
        assert_eq!(rows[0].cep_raw, "01001-000");
        assert_eq!(rows[1].identifier.as_deref(), Some("P2"));
        assert_eq!(rows[1].cep_raw, "00000000");
    }

    #[test]
    fn test_read_rows_empty_identifier_is_none() {
        let rows = read_rows(
            b"Proposta,CEP\n,01001000\n",
            "CEP",
            "Proposta",
        )
        .unwrap();
        assert_eq!(rows[0].identifier, None);
    }

    #[test]
    fn test_export_headers_and_row_shape() {
        let records = vec![ResultRecord {
            identifier: Some("P1".to_string()),
            cep: "01001-000".to_string(),
            street: Some("Praça da Sé".to_string()),
            neighborhood: Some("Sé".to_string()),
            city: Some("São Paulo".to_string()),
            state: Some("SP".to_string()),
            status: "BrasilAPI: Sucesso".to_string(),
        }];

        let bytes = write_results_csv(&records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "PROPOSTA,CEP,ENDEREÇO,BAIRRO,CIDADE,ESTADO,STATUS"
        );
        assert_eq!(
            lines.next().unwrap(),
            "P1,01001-000,Praça da Sé,Sé,São Paulo,SP,BrasilAPI: Sucesso"
        );
    }

    #[test]
    fn test_export_failure_row_keeps_status_with_empty_fields() {
        let records = vec![ResultRecord {
            identifier: Some("P2".to_string()),
            cep: "123".to_string(),
            street: None,
            neighborhood: None,
            city: None,
            state: None,
            status: "Formato de CEP Inválido".to_string(),
        }];

        let bytes = write_results_csv(&records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("P2,123,,,,,Formato de CEP Inválido"));
    }
}
