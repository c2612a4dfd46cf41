//! List sort state helpers

use serde::{Deserialize, Serialize};

/// Sort direction and field for a list endpoint. `order` is `-1`
/// (descending) or `1` (ascending) on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub order: i32,
    pub field: String,
}

/// Default sort: newest first. An empty field falls back to `created_at`.
pub fn init_sort(field: &str) -> SortSpec {
    let field = if field.is_empty() { "created_at" } else { field };

    SortSpec {
        order: -1,
        field: field.to_string(),
    }
}

pub fn toggle_sort(order: i32) -> i32 {
    match order {
        1 => -1,
        -1 => 1,
        _ => 1,
    }
}

/// Icon for a column header given the active sort.
pub fn sort_icon(sort: &SortSpec, field: &str) -> &'static str {
    if sort.order == -1 && sort.field == field {
        return "pi-sort-down";
    }
    if sort.order == 1 && sort.field == field {
        return "pi-sort-up";
    }
    "pi-sort"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_sort_defaults() {
        let sort = init_sort("");
        assert_eq!(sort.field, "created_at");
        assert_eq!(sort.order, -1);

        assert_eq!(init_sort("amount").field, "amount");
    }

    #[test]
    fn test_toggle_sort() {
        assert_eq!(toggle_sort(1), -1);
        assert_eq!(toggle_sort(-1), 1);
        assert_eq!(toggle_sort(0), 1);
    }

    #[test]
    fn test_sort_icon() {
        let sort = init_sort("date");
        assert_eq!(sort_icon(&sort, "date"), "pi-sort-down");
        assert_eq!(sort_icon(&sort, "amount"), "pi-sort");

        let asc = SortSpec {
            order: 1,
            field: "date".to_string(),
        };
        assert_eq!(sort_icon(&asc, "date"), "pi-sort-up");
    }
}
