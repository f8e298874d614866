// This file is part of the product Caseboard.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::yaml_store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::RwLock;

const AUDIT_FILE_NAME: &str = "audit.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Group,
    Property,
    Value,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Group => write!(f, "group"),
            TargetKind::Property => write!(f, "property"),
            TargetKind::Value => write!(f, "value"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: String,
    pub target_kind: TargetKind,
    pub target_id: u64,
    pub at: DateTime<Utc>,
    pub action: String,
}

#[derive(Debug)]
pub struct AuditError {
    message: String,
}

impl AuditError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuditError {}

/// Append-only audit trail. Entries are written alongside every mutating
/// environment action and are never updated or removed here.
pub struct AuditLog {
    audit_file: PathBuf,
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn new(state_sys_dir: PathBuf) -> Result<Self, AuditError> {
        let audit_file = state_sys_dir.join(AUDIT_FILE_NAME);
        let entries: Option<Vec<AuditEntry>> = yaml_store::read_yaml_file(&audit_file, "audit")
            .map_err(|err| AuditError::new(err.to_string()))?;
        Ok(Self {
            audit_file,
            entries: RwLock::new(entries.unwrap_or_default()),
        })
    }

    pub fn log_action(
        &self,
        actor: &str,
        target_kind: TargetKind,
        target_id: u64,
        action: impl Into<String>,
    ) -> Result<(), AuditError> {
        let entry = AuditEntry {
            actor: actor.to_string(),
            target_kind,
            target_id,
            at: Utc::now(),
            action: action.into(),
        };

        let mut guard = self
            .entries
            .write()
            .map_err(|_| AuditError::new("Audit log lock poisoned"))?;
        let mut updated = guard.clone();
        updated.push(entry);
        yaml_store::write_yaml_file(&self.audit_file, "audit", &updated)
            .map_err(|err| AuditError::new(err.to_string()))?;
        *guard = updated;
        Ok(())
    }

    /// Entries for a set of targets of one kind, grouped by target id.
    pub fn entries_for(
        &self,
        target_kind: TargetKind,
        target_ids: &[u64],
    ) -> Result<BTreeMap<u64, Vec<AuditEntry>>, AuditError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| AuditError::new("Audit log lock poisoned"))?;
        let mut grouped: BTreeMap<u64, Vec<AuditEntry>> = BTreeMap::new();
        for entry in guard.iter() {
            if entry.target_kind == target_kind && target_ids.contains(&entry.target_id) {
                grouped
                    .entry(entry.target_id)
                    .or_default()
                    .push(entry.clone());
            }
        }
        Ok(grouped)
    }

    pub fn entry_count(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
