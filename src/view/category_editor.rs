//! Category dialog state and its wire conversion.

use crate::api::{CategoryForm, CustomFieldPayload, UploadFile};
use crate::error::{PortalError, Result};
use crate::models::{Category, CustomField, FieldType};

/// Raw editor input for one custom field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldDraft {
    pub name: String,
    pub field_type: FieldType,
    pub min_size: String,
    pub max_size: String,
    pub icon: Option<String>,
}

impl FieldDraft {
    pub fn from_field(field: &CustomField) -> Self {
        Self {
            name: field.field_name.clone(),
            field_type: field.field_type,
            min_size: size_text(field.min_size),
            max_size: size_text(field.max_size),
            icon: Some(field.icon.clone()).filter(|i| !i.is_empty()),
        }
    }

    pub fn to_payload(&self) -> CustomFieldPayload {
        CustomFieldPayload {
            name: self.name.trim().to_string(),
            field_type: self.field_type.as_str().to_string(),
            min_size: coerce_size(&self.min_size),
            max_size: coerce_size(&self.max_size),
            icon: self.icon.clone().unwrap_or_default(),
        }
    }
}

/// Missing or non-numeric input becomes 0.
pub fn coerce_size(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn size_text(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldRow {
    saved: FieldDraft,
    editing: Option<FieldDraft>,
}

/// Create/edit dialog for a category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryEditor {
    category_id: Option<i64>,
    locked: bool,
    pub name: String,
    pub icon_path: Option<String>,
    pub new_icon: Option<UploadFile>,
    rows: Vec<FieldRow>,
}

impl CategoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(category: &Category) -> Self {
        Self {
            category_id: Some(category.id),
            locked: category.is_locked,
            name: category.name.clone(),
            icon_path: category.icon.clone(),
            new_icon: None,
            rows: category
                .custom_fields
                .iter()
                .map(|f| FieldRow {
                    saved: FieldDraft::from_field(f),
                    editing: None,
                })
                .collect(),
        }
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category_id
    }

    pub fn fields(&self) -> Vec<&FieldDraft> {
        self.rows.iter().map(|r| &r.saved).collect()
    }

    fn ensure_unlocked(&self) -> Result<()> {
        match (self.locked, self.category_id) {
            (true, Some(id)) => Err(PortalError::CategoryLocked(id)),
            _ => Ok(()),
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.ensure_unlocked()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_icon(&mut self, icon: UploadFile) -> Result<()> {
        self.ensure_unlocked()?;
        self.new_icon = Some(icon);
        Ok(())
    }

    /// Append a field row; it opens in edit mode.
    pub fn add_field(&mut self) -> Result<usize> {
        self.ensure_unlocked()?;
        self.rows.push(FieldRow {
            saved: FieldDraft::default(),
            editing: Some(FieldDraft::default()),
        });
        Ok(self.rows.len() - 1)
    }

    /// Open the editor of a row; only one editor per row at a time.
    pub fn begin_edit(&mut self, index: usize) -> Result<&mut FieldDraft> {
        self.ensure_unlocked()?;
        let row = self.row_mut(index)?;
        if row.editing.is_some() {
            return Err(PortalError::Validation(format!(
                "Field {} is already being edited",
                index + 1
            )));
        }
        let draft = row.saved.clone();
        Ok(row.editing.insert(draft))
    }

    pub fn draft_mut(&mut self, index: usize) -> Option<&mut FieldDraft> {
        self.rows.get_mut(index).and_then(|r| r.editing.as_mut())
    }

    pub fn commit_edit(&mut self, index: usize) -> Result<()> {
        let row = self.row_mut(index)?;
        let draft = row
            .editing
            .take()
            .ok_or_else(|| PortalError::Validation(format!("Field {} is not being edited", index + 1)))?;
        if draft.name.trim().is_empty() {
            row.editing = Some(draft);
            return Err(PortalError::Validation("Field name is required".to_string()));
        }
        row.saved = draft;
        Ok(())
    }

    pub fn cancel_edit(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.editing = None;
        }
    }

    /// Drop a row; it never reaches the server.
    pub fn remove_field(&mut self, index: usize) -> Result<()> {
        self.ensure_unlocked()?;
        self.row_mut(index)?;
        self.rows.remove(index);
        Ok(())
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut FieldRow> {
        self.rows
            .get_mut(index)
            .ok_or_else(|| PortalError::Validation(format!("No field at position {}", index + 1)))
    }

    /// Validate and build the form sent to the server.
    ///
    /// Rows still in edit mode are rejected; committed rows with an empty
    /// name (never edited) are skipped.
    pub fn to_form(&self) -> Result<CategoryForm> {
        self.ensure_unlocked()?;
        if self.name.trim().is_empty() {
            return Err(PortalError::Validation("Category name is required".to_string()));
        }
        if let Some(index) = self.rows.iter().position(|r| r.editing.is_some()) {
            return Err(PortalError::Validation(format!(
                "Finish editing field {} before saving",
                index + 1
            )));
        }

        Ok(CategoryForm {
            name: self.name.trim().to_string(),
            icon: self.new_icon.clone(),
            icon_path: self.icon_path.clone(),
            custom_fields: self
                .rows
                .iter()
                .filter(|r| !r.saved.name.trim().is_empty())
                .map(|r| r.saved.to_payload())
                .collect(),
        })
    }
}
