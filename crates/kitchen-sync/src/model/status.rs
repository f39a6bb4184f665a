//! Point-in-time views of orders and shelves, and the events published when
//! shelf contents change.

use crate::model::{OrderId, Temperature};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub id: OrderId,
    pub name: String,
    pub shelf: String,
    pub temp: Temperature,
    pub value: f64,
    /// `value / shelfLife`, or zero for orders with no shelf life.
    pub normalized_value: f64,
}

/// Contents of one shelf, sorted by order name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfStatus {
    pub shelf_name: String,
    pub order_statuses: Vec<OrderStatus>,
}

impl ShelfStatus {
    pub fn new(shelf_name: impl Into<String>, mut order_statuses: Vec<OrderStatus>) -> Self {
        order_statuses.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            shelf_name: shelf_name.into(),
            order_statuses,
        }
    }

    pub fn len(&self) -> usize {
        self.order_statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_statuses.is_empty()
    }
}

/// A change to shelf contents, as published to a status sink.
///
/// Serialized with an `action` tag:
///
/// ```json
/// {"action": "move-order", "fromShelf": "overflow", "toShelf": "hot", "orderStatus": {...}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action")]
pub enum StatusEvent {
    #[serde(rename = "add-order", rename_all = "camelCase")]
    Added {
        shelf: String,
        order_status: OrderStatus,
    },
    #[serde(rename = "remove-order", rename_all = "camelCase")]
    Removed {
        shelf: String,
        order_status: OrderStatus,
    },
    #[serde(rename = "move-order", rename_all = "camelCase")]
    Moved {
        from_shelf: String,
        to_shelf: String,
        order_status: OrderStatus,
    },
    #[serde(rename = "update-value", rename_all = "camelCase")]
    ValueUpdated {
        shelf: String,
        order_status: OrderStatus,
    },
}

impl StatusEvent {
    pub fn action(&self) -> &'static str {
        match self {
            StatusEvent::Added { .. } => "add-order",
            StatusEvent::Removed { .. } => "remove-order",
            StatusEvent::Moved { .. } => "move-order",
            StatusEvent::ValueUpdated { .. } => "update-value",
        }
    }

    pub fn order_status(&self) -> &OrderStatus {
        match self {
            StatusEvent::Added { order_status, .. }
            | StatusEvent::Removed { order_status, .. }
            | StatusEvent::Moved { order_status, .. }
            | StatusEvent::ValueUpdated { order_status, .. } => order_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status(name: &str) -> OrderStatus {
        OrderStatus {
            id: OrderId(Uuid::nil()),
            name: name.to_string(),
            shelf: "hot".to_string(),
            temp: Temperature::Hot,
            value: 5.0,
            normalized_value: 0.5,
        }
    }

    #[test]
    fn test_shelf_status_sorted_by_name() {
        let shelf = ShelfStatus::new("hot", vec![status("Tacos"), status("Arepas"), status("Pho")]);
        let names: Vec<_> = shelf.order_statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Arepas", "Pho", "Tacos"]);
    }

    #[test]
    fn test_event_serialization() {
        let event = StatusEvent::Moved {
            from_shelf: "overflow".to_string(),
            to_shelf: "hot".to_string(),
            order_status: status("Pho"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "move-order");
        assert_eq!(json["fromShelf"], "overflow");
        assert_eq!(json["toShelf"], "hot");
        assert_eq!(json["orderStatus"]["normalizedValue"], 0.5);
        assert_eq!(json["orderStatus"]["temp"], "hot");
        assert_eq!(event.action(), "move-order");
    }
}
