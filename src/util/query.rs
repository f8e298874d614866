// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::HttpRequest;

/// Decoded query string that keeps repeated parameters, which the admin UI
/// uses for multi-select actions (`id=1&id=2`, `selected_property_ids=...`).
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn from_request(req: &HttpRequest) -> Self {
        Self::parse(req.query_string())
    }

    pub fn parse(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
        Self { pairs }
    }

    /// First value for the key, like a single-valued form field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// First non-empty value for the key.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Every value submitted for the key, in submission order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Parse every value for the key as an id, dropping entries that are not
    /// well-formed integers.
    pub fn get_ids(&self, key: &str) -> Vec<u64> {
        self.get_all(key)
            .into_iter()
            .filter_map(|value| value.parse::<u64>().ok())
            .collect()
    }
}
