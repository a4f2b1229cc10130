// src/workflow.rs
//
// Controlador do checklist guiado: percorre os itens ativos em ordem,
// guarda o resultado de cada um (seguro/inseguro + foto + horário) e
// responde se a inspeção terminou e se a unidade está segura.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    checklist::ChecklistItem,
    inspection::{AnalysisRecord, ReportItemPayload},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Checklist item {0} is not part of this inspection.")]
    UnknownItem(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub checklist_item_id: i64,
    pub is_safe: bool,
    pub photo: String,
    pub remarks: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct InspectionWorkflow {
    items: Vec<ChecklistItem>,
    records: HashMap<i64, ItemRecord>,
    // índice em `items` do próximo item pendente
    current: Option<usize>,
}

impl InspectionWorkflow {
    /// Itens inativos são descartados; a ordem recebida é preservada.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ChecklistItem>,
    {
        let items: Vec<ChecklistItem> = items.into_iter().filter(|item| item.is_active).collect();
        let current = if items.is_empty() { None } else { Some(0) };
        Self {
            items,
            records: HashMap::new(),
            current,
        }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn next_item(&self) -> Option<&ChecklistItem> {
        self.current.map(|idx| &self.items[idx])
    }

    pub fn record(
        &mut self,
        checklist_item_id: i64,
        is_safe: bool,
        photo: impl Into<String>,
        remarks: Option<String>,
    ) -> Result<bool, WorkflowError> {
        self.record_at(checklist_item_id, is_safe, photo, remarks, Utc::now())
    }

    /// Grava (ou substitui) o resultado de um item.
    ///
    /// Retorna `true` apenas na submissão que completa a inspeção.
    pub fn record_at(
        &mut self,
        checklist_item_id: i64,
        is_safe: bool,
        photo: impl Into<String>,
        remarks: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, WorkflowError> {
        if !self.items.iter().any(|item| item.id == checklist_item_id) {
            return Err(WorkflowError::UnknownItem(checklist_item_id));
        }

        let was_complete = self.is_complete();

        // last write wins
        self.records.insert(
            checklist_item_id,
            ItemRecord {
                checklist_item_id,
                is_safe,
                photo: photo.into(),
                remarks,
                timestamp,
            },
        );

        self.current = self
            .items
            .iter()
            .position(|item| !self.records.contains_key(&item.id));

        Ok(!was_complete && self.is_complete())
    }

    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| self.records.contains_key(&item.id))
    }

    pub fn overall_safe(&self) -> bool {
        self.records.values().all(|record| record.is_safe)
    }

    pub fn pending(&self) -> Vec<&ChecklistItem> {
        self.items
            .iter()
            .filter(|item| !self.records.contains_key(&item.id))
            .collect()
    }

    /// Registros na ordem do checklist.
    pub fn records(&self) -> Vec<(&ChecklistItem, &ItemRecord)> {
        self.items
            .iter()
            .filter_map(|item| self.records.get(&item.id).map(|record| (item, record)))
            .collect()
    }

    pub fn analysis_records(&self) -> Vec<AnalysisRecord> {
        self.records()
            .into_iter()
            .map(|(item, record)| AnalysisRecord {
                checklist_item_id: item.id,
                part_name: Some(item.part_name.clone()),
                question: Some(item.question.clone()),
                photo: record.photo.clone(),
                is_safe: record.is_safe,
                timestamp: record.timestamp,
            })
            .collect()
    }

    /// Itens do relatório com snapshot de part_name/question.
    pub fn report_items(&self) -> Vec<ReportItemPayload> {
        self.records()
            .into_iter()
            .map(|(item, record)| ReportItemPayload {
                checklist_item_id: Some(item.id),
                part_name: item.part_name.clone(),
                question: item.question.clone(),
                is_safe: record.is_safe,
                photo: record.photo.clone(),
                inspected_at: Some(record.timestamp),
                remarks: record.remarks.clone(),
            })
            .collect()
    }
}
