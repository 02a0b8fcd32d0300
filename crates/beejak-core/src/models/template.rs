//! Invoice template layouts: positioned components, theme colors, and the
//! editing operations the designer UI drives.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::TemplateError;

fn default_true() -> bool {
    true
}

/// The kinds of component a template page can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Header,
    InvoiceDetails,
    ClientInfo,
    ItemsTable,
    Totals,
    Notes,
    Logo,
    Signature,
    QrCode,
}

/// Columns the items table may display, in wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemColumn {
    Description,
    Quantity,
    Rate,
    HsnCode,
    GstRate,
    Amount,
}

impl ItemColumn {
    pub const ALL: [ItemColumn; 6] = [
        ItemColumn::Description,
        ItemColumn::Quantity,
        ItemColumn::Rate,
        ItemColumn::HsnCode,
        ItemColumn::GstRate,
        ItemColumn::Amount,
    ];

    /// Wire name of the column.
    pub fn name(&self) -> &'static str {
        match self {
            ItemColumn::Description => "description",
            ItemColumn::Quantity => "quantity",
            ItemColumn::Rate => "rate",
            ItemColumn::HsnCode => "hsnCode",
            ItemColumn::GstRate => "gstRate",
            ItemColumn::Amount => "amount",
        }
    }

    /// Parse a wire name back into a column.
    pub fn parse(name: &str) -> Option<ItemColumn> {
        ItemColumn::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Placement of a component's top-left corner, in percent of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Extent of a component, in percent of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// One positioned block on the template page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub position: Position,
    pub size: Size,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Item-table column selection, by wire name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Token paths the component renders, e.g. `client.name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Free-form component payload (logo data URL, QR contents, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Value>,
}

impl TemplateComponent {
    /// New visible, unlocked component with no extra payload.
    pub fn new(
        id: impl Into<String>,
        kind: ComponentType,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position { x, y },
            size: Size { width, height },
            visible: true,
            locked: false,
            columns: None,
            fields: None,
            data: None,
            styles: None,
        }
    }

    /// Check geometry and per-kind configuration.
    ///
    /// Positions and sizes must be finite percentages in 0-100; values
    /// outside that range are rejected, not clamped. Column names are
    /// checked wherever present, and an items table must name at least
    /// one column.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let checks: [(&'static str, f64); 4] = [
            ("position.x", self.position.x),
            ("position.y", self.position.y),
            ("size.width", self.size.width),
            ("size.height", self.size.height),
        ];
        for (field, value) in checks {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(TemplateError::OutOfRange {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }

        if let Some(columns) = &self.columns {
            for column in columns {
                if ItemColumn::parse(column).is_none() {
                    return Err(TemplateError::UnknownColumn {
                        id: self.id.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        if self.kind == ComponentType::ItemsTable
            && self.columns.as_ref().is_none_or(|c| c.is_empty())
        {
            return Err(TemplateError::EmptyColumns(self.id.clone()));
        }

        Ok(())
    }
}

/// Palette applied to every component of a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<String>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#1a237e".to_string(),
            secondary: "#5c6bc0".to_string(),
            text: "#212121".to_string(),
            background: "#ffffff".to_string(),
            accent: None,
            muted: None,
        }
    }
}

/// Editor grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub enabled: bool,
    /// Grid step in percent of the page.
    pub size: f64,
    pub snap: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 2.5,
            snap: true,
        }
    }
}

/// A full page layout. Component order is z-order: later entries draw on
/// top of earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLayout {
    #[serde(default)]
    pub components: Vec<TemplateComponent>,
    #[serde(default)]
    pub theme: ThemeColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSettings>,
}

impl TemplateLayout {
    /// Append a component after validating it and checking id uniqueness.
    pub fn insert(&mut self, component: TemplateComponent) -> Result<(), TemplateError> {
        component.validate()?;
        if self.components.iter().any(|c| c.id == component.id) {
            return Err(TemplateError::DuplicateId(component.id));
        }
        self.components.push(component);
        Ok(())
    }

    /// Replace the component with the same id, keeping its z-position.
    pub fn update(&mut self, component: TemplateComponent) -> Result<(), TemplateError> {
        component.validate()?;
        match self.components.iter_mut().find(|c| c.id == component.id) {
            Some(slot) => {
                *slot = component;
                Ok(())
            }
            None => Err(TemplateError::UnknownId(component.id)),
        }
    }

    /// Remove a component by id and return it.
    pub fn remove(&mut self, id: &str) -> Result<TemplateComponent, TemplateError> {
        match self.components.iter().position(|c| c.id == id) {
            Some(index) => Ok(self.components.remove(index)),
            None => Err(TemplateError::UnknownId(id.to_string())),
        }
    }

    /// Move a component to a new z-position, shifting the ones between.
    pub fn move_component(&mut self, id: &str, to: usize) -> Result<(), TemplateError> {
        let from = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TemplateError::UnknownId(id.to_string()))?;
        if to >= self.components.len() {
            return Err(TemplateError::IndexOutOfBounds {
                index: to,
                len: self.components.len(),
            });
        }
        let component = self.components.remove(from);
        self.components.insert(to, component);
        Ok(())
    }

    /// Look up a component by id.
    pub fn component(&self, id: &str) -> Option<&TemplateComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Validate every component and the id set as a whole.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for component in &self.components {
            component.validate()?;
            if !seen.insert(component.id.as_str()) {
                return Err(TemplateError::DuplicateId(component.id.clone()));
            }
        }
        Ok(())
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from a JSON value and re-validate the result.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        let layout: TemplateLayout = serde_json::from_value(value)?;
        layout.validate()?;
        Ok(layout)
    }

    /// The layout a fresh invoice template starts from.
    pub fn starter() -> Self {
        let mut header = TemplateComponent::new("header", ComponentType::Header, 5.0, 2.0, 90.0, 8.0);
        header.fields = Some(vec!["business.name".to_string(), "business.gstin".to_string()]);

        let mut details = TemplateComponent::new(
            "invoice-details",
            ComponentType::InvoiceDetails,
            55.0,
            12.0,
            40.0,
            10.0,
        );
        details.fields = Some(vec![
            "invoice.number".to_string(),
            "invoice.date".to_string(),
            "invoice.dueDate".to_string(),
        ]);

        let mut client = TemplateComponent::new(
            "client-info",
            ComponentType::ClientInfo,
            5.0,
            12.0,
            45.0,
            10.0,
        );
        client.fields = Some(vec![
            "client.name".to_string(),
            "client.address".to_string(),
            "client.gstin".to_string(),
        ]);

        let mut items = TemplateComponent::new(
            "items-table",
            ComponentType::ItemsTable,
            5.0,
            25.0,
            90.0,
            40.0,
        );
        items.columns = Some(
            ItemColumn::ALL
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        );

        let mut totals =
            TemplateComponent::new("totals", ComponentType::Totals, 55.0, 68.0, 40.0, 14.0);
        totals.fields = Some(vec![
            "totals.subtotal".to_string(),
            "totals.gstAmount".to_string(),
            "totals.roundOff".to_string(),
            "totals.total".to_string(),
            "totals.totalInWords".to_string(),
        ]);

        let mut notes = TemplateComponent::new("notes", ComponentType::Notes, 5.0, 85.0, 90.0, 10.0);
        notes.fields = Some(vec!["invoice.notes".to_string()]);

        Self {
            components: vec![header, details, client, items, totals, notes],
            theme: ThemeColors::default(),
            grid: Some(GridSettings::default()),
        }
    }
}

/// A saved template as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTemplate {
    pub id: Uuid,
    pub name: String,
    pub layout: TemplateLayout,
    #[serde(default)]
    pub is_default: bool,
}

/// Payload for saving a new template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreate {
    pub name: String,
    pub layout: TemplateLayout,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial-update payload for a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<TemplateLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}
