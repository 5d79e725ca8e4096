use std::fmt;

use serde::{Deserialize, Serialize};

/// Which export layout an input follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Ledger export with a 4-row header region.
    Closing,
    /// Flat export with one header row.
    ContractList,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closing => write!(f, "closing"),
            Self::ContractList => write!(f, "contract_list"),
        }
    }
}

/// Language variant of the column-name contract and report labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::De => write!(f, "de"),
            Self::En => write!(f, "en"),
        }
    }
}

/// Name of the synthetic line-number column added by the fallback key scheme.
pub const LINE_INDEX_COLUMN: &str = "LineIndex";

/// Name of the key column in exported tables.
pub const KEY_COLUMN: &str = "Key";

/// Identity columns for one record kind in one language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityProfile {
    pub kind: RecordKind,
    pub language: Language,
    /// Closing: contract id. Contract list: system id.
    pub primary: String,
    pub asset: String,
    pub payment: Option<String>,
    pub option: Option<String>,
}

impl IdentityProfile {
    pub fn new(kind: RecordKind, language: Language) -> Self {
        match (kind, language) {
            (RecordKind::Closing, Language::De) => {
                Self::closing(language, "Vertrags-ID", "Asset-ID")
            }
            (RecordKind::Closing, Language::En) => {
                Self::closing(language, "Contract ID", "Asset ID")
            }
            (RecordKind::ContractList, Language::De) => Self {
                kind,
                language,
                primary: "System-ID".into(),
                asset: "Asset System-ID".into(),
                payment: Some("Zahlungs-ID".into()),
                option: Some("Options-ID".into()),
            },
            (RecordKind::ContractList, Language::En) => Self {
                kind,
                language,
                primary: "System ID".into(),
                asset: "Asset [System ID]".into(),
                payment: Some("Payment ID".into()),
                option: Some("Option ID".into()),
            },
        }
    }

    fn closing(language: Language, primary: &str, asset: &str) -> Self {
        Self {
            kind: RecordKind::Closing,
            language,
            primary: primary.into(),
            asset: asset.into(),
            payment: None,
            option: None,
        }
    }

    pub fn required(&self) -> [&str; 2] {
        [&self.primary, &self.asset]
    }

    pub fn optional(&self) -> Vec<&str> {
        self.payment.iter().chain(self.option.iter()).map(String::as_str).collect()
    }

    /// All identity column names, required first.
    pub fn identity_columns(&self) -> Vec<&str> {
        let mut cols = self.required().to_vec();
        cols.extend(self.optional());
        cols
    }

    /// Identity, key and line-index columns never take part in value comparison.
    pub fn is_excluded(&self, column: &str) -> bool {
        column == KEY_COLUMN
            || column == LINE_INDEX_COLUMN
            || self.identity_columns().contains(&column)
    }

    pub fn labels(&self) -> &'static Labels {
        Labels::for_output(self.kind, self.language)
    }
}

/// Report labels and default output names for one kind/language.
#[derive(Debug)]
pub struct Labels {
    pub differences: &'static str,
    pub no_differences: &'static str,
    pub only_in_test: &'static str,
    pub only_in_prod: &'static str,
    pub line_index: &'static str,
    pub test_file: &'static str,
    pub test_sheet: &'static str,
    pub prod_file: &'static str,
    pub prod_sheet: &'static str,
    pub report_file: &'static str,
    pub report_sheet: &'static str,
}

const CLOSING_DE: Labels = Labels {
    differences: "Unterschiede",
    no_differences: "Keine",
    only_in_test: "Nur in Test",
    only_in_prod: "Nur in Prod",
    line_index: "Zeilen-Index",
    test_file: "bereinigt_test.xlsx",
    test_sheet: "Bereinigt_Test",
    prod_file: "bereinigt_prod.xlsx",
    prod_sheet: "Bereinigt_Prod",
    report_file: "vergleichsergebnis.xlsx",
    report_sheet: "Vergleich",
};

const CLOSING_EN: Labels = Labels {
    differences: "Differences",
    no_differences: "None",
    only_in_test: "Only in Test",
    only_in_prod: "Only in Prod",
    line_index: "Line index",
    test_file: "cleaned_test.xlsx",
    test_sheet: "Cleaned_Test",
    prod_file: "cleaned_prod.xlsx",
    prod_sheet: "Cleaned_Prod",
    report_file: "comparison_result.xlsx",
    report_sheet: "Comparison",
};

const CONTRACTS_DE: Labels = Labels {
    test_file: "vertragsliste_test.xlsx",
    test_sheet: "Vertragsliste_Test",
    prod_file: "vertragsliste_prod.xlsx",
    prod_sheet: "Vertragsliste_Prod",
    report_file: "vertragslisten_vergleich.xlsx",
    report_sheet: "Vertragslisten-Vergleich",
    ..CLOSING_DE
};

const CONTRACTS_EN: Labels = Labels {
    test_file: "contract_list_test.xlsx",
    test_sheet: "ContractList_Test",
    prod_file: "contract_list_prod.xlsx",
    prod_sheet: "ContractList_Prod",
    report_file: "contract_list_comparison.xlsx",
    report_sheet: "ContractList_Comparison",
    ..CLOSING_EN
};

impl Labels {
    pub fn for_output(kind: RecordKind, language: Language) -> &'static Labels {
        match (kind, language) {
            (RecordKind::Closing, Language::De) => &CLOSING_DE,
            (RecordKind::Closing, Language::En) => &CLOSING_EN,
            (RecordKind::ContractList, Language::De) => &CONTRACTS_DE,
            (RecordKind::ContractList, Language::En) => &CONTRACTS_EN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_list_en_columns() {
        let p = IdentityProfile::new(RecordKind::ContractList, Language::En);
        assert_eq!(p.required(), ["System ID", "Asset [System ID]"]);
        assert_eq!(p.optional(), vec!["Payment ID", "Option ID"]);
    }

    #[test]
    fn closing_has_no_optional_columns() {
        let p = IdentityProfile::new(RecordKind::Closing, Language::De);
        assert_eq!(p.identity_columns(), vec!["Vertrags-ID", "Asset-ID"]);
        assert!(p.optional().is_empty());
    }

    #[test]
    fn excluded_columns() {
        let p = IdentityProfile::new(RecordKind::ContractList, Language::De);
        assert!(p.is_excluded("Key"));
        assert!(p.is_excluded("LineIndex"));
        assert!(p.is_excluded("Zahlungs-ID"));
        assert!(!p.is_excluded("Betrag"));
    }

    #[test]
    fn labels_per_kind() {
        let l = Labels::for_output(RecordKind::ContractList, Language::De);
        assert_eq!(l.differences, "Unterschiede");
        assert_eq!(l.report_sheet, "Vertragslisten-Vergleich");
        let l = Labels::for_output(RecordKind::Closing, Language::En);
        assert_eq!(l.only_in_prod, "Only in Prod");
        assert_eq!(l.report_file, "comparison_result.xlsx");
    }
}
