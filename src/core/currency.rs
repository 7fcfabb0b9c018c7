use crate::domain::ports::CurrencyCatalog;
use std::collections::BTreeSet;

pub const DEFAULT_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "CAD", "AUD", "JPY", "CNY", "HKD", "TWD", "SGD", "INR", "KRW", "CHF",
    "SEK", "NZD", "BRL", "MXN", "RUB", "TRY",
];

/// 可接受的幣別清單，比對前一律轉大寫
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyAllowList {
    codes: BTreeSet<String>,
}

impl CurrencyAllowList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|code| code.as_ref().trim().to_ascii_uppercase())
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CurrencyAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCIES)
    }
}

impl CurrencyCatalog for CurrencyAllowList {
    fn is_valid_currency(&self, code: &str) -> bool {
        self.codes.contains(&code.trim().to_ascii_uppercase())
    }
}
