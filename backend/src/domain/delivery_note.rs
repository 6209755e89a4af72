//! Delivery notes: itemised records of work and material for a project.
//!
//! A note moves through [`NoteState`]: it starts as a draft, may gain a
//! cached PDF reference at any point, and once signed can be neither signed
//! again nor deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::FieldError;
use super::{DeliveryNoteId, ProjectId, UserId};

/// One billable line.
///
/// Quantities and prices are stored as supplied; negative values are not
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineItem {
    /// Labour billed by the hour.
    #[serde(rename_all = "camelCase")]
    Hours {
        person: String,
        hours: f64,
        unit_price: f64,
    },
    /// Material billed per unit.
    #[serde(rename_all = "camelCase")]
    Material {
        description: String,
        quantity: f64,
        unit_price: f64,
    },
}

impl LineItem {
    /// Single-line description used in rendered documents.
    ///
    /// # Examples
    /// ```
    /// use albaran::domain::LineItem;
    ///
    /// let item = LineItem::Hours { person: "Ana".into(), hours: 8.0, unit_price: 25.5 };
    /// assert_eq!(item.describe(), "Hours: Ana - 8h at 25.5/h");
    /// ```
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Hours {
                person,
                hours,
                unit_price,
            } => format!("Hours: {person} - {hours}h at {unit_price}/h"),
            Self::Material {
                description,
                quantity,
                unit_price,
            } => format!("Material: {description} - {quantity} units at {unit_price}/unit"),
        }
    }
}

/// Lifecycle position of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    /// Created, unsigned, no cached PDF.
    Draft,
    /// Unsigned with a cached PDF reference.
    PdfCached,
    /// Signed. Terminal for signing and blocks deletion.
    Signed,
}

/// Stored delivery note.
///
/// ## Invariants
/// - `signature_url` is set if and only if `is_signed` is true.
/// - `pdf_url`, once set, is never replaced.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNote {
    #[schema(value_type = String)]
    pub id: DeliveryNoteId,
    #[schema(value_type = String)]
    pub project_id: ProjectId,
    #[schema(value_type = String)]
    pub owner_id: UserId,
    pub items: Vec<LineItem>,
    pub is_signed: bool,
    pub signature_url: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryNote {
    #[must_use]
    pub fn state(&self) -> NoteState {
        if self.is_signed {
            NoteState::Signed
        } else if self.pdf_url.is_some() {
            NoteState::PdfCached
        } else {
            NoteState::Draft
        }
    }
}

/// Raw create payload. `project` is the referenced project id.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNoteRequest {
    pub project: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Validated fields for a new note.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeliveryNote {
    pub project_id: ProjectId,
    pub items: Vec<LineItem>,
}

impl TryFrom<DeliveryNoteRequest> for NewDeliveryNote {
    type Error = FieldError;

    fn try_from(value: DeliveryNoteRequest) -> Result<Self, Self::Error> {
        let project_id = value
            .project
            .map(ProjectId::new)
            .ok_or(FieldError::Missing("project"))?;
        Ok(Self {
            project_id,
            items: value.items,
        })
    }
}

/// A note expanded with the names a reader needs.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNoteDetails {
    #[serde(flatten)]
    pub note: DeliveryNote,
    pub state: NoteState,
    pub project_title: String,
    pub client_name: String,
    pub owner_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn decodes_tagged_items() {
        let items: Vec<LineItem> = serde_json::from_value(json!([
            { "type": "hours", "person": "Ana", "hours": 4, "unitPrice": 30 },
            { "type": "material", "description": "Cable", "quantity": 10, "unitPrice": 1.5 }
        ]))
        .expect("decode items");
        assert_eq!(
            items,
            vec![
                LineItem::Hours {
                    person: "Ana".to_owned(),
                    hours: 4.0,
                    unit_price: 30.0,
                },
                LineItem::Material {
                    description: "Cable".to_owned(),
                    quantity: 10.0,
                    unit_price: 1.5,
                },
            ]
        );
    }

    #[rstest]
    fn rejects_unknown_item_type() {
        let decoded: Result<LineItem, _> =
            serde_json::from_value(json!({ "type": "travel", "km": 12 }));
        assert!(decoded.is_err());
    }

    #[rstest]
    #[case(
        LineItem::Material { description: "Cable".into(), quantity: 10.0, unit_price: 1.5 },
        "Material: Cable - 10 units at 1.5/unit"
    )]
    #[case(
        LineItem::Hours { person: "Luis".into(), hours: 2.5, unit_price: 40.0 },
        "Hours: Luis - 2.5h at 40/h"
    )]
    fn describes_items(#[case] item: LineItem, #[case] expected: &str) {
        assert_eq!(item.describe(), expected);
    }

    #[rstest]
    fn request_requires_project() {
        assert_eq!(
            NewDeliveryNote::try_from(DeliveryNoteRequest::default()),
            Err(FieldError::Missing("project"))
        );
    }

    #[rstest]
    fn negative_quantities_are_kept() {
        let item: LineItem = serde_json::from_value(
            json!({ "type": "material", "description": "Refund", "quantity": -1, "unitPrice": 5 }),
        )
        .expect("decode");
        assert_eq!(item.describe(), "Material: Refund - -1 units at 5/unit");
    }
}
