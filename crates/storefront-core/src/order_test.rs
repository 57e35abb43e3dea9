use super::*;

fn complete_draft() -> OrderDraft {
    OrderDraft {
        name: "Anna Petrova".to_string(),
        email: "anna@example.com".to_string(),
        phone: "+7 900 000-00-00".to_string(),
        address: "Moscow, Bolshaya Semyonovskaya 38".to_string(),
        delivery_date: "2026-10-21".to_string(),
        delivery_interval: "18:00-22:00".to_string(),
        comment: "  ring twice ".to_string(),
        subscribe: true,
        items: vec![3, 8],
    }
}

#[test]
fn email_pattern_requires_at_and_dot_without_whitespace() {
    assert!(is_valid_email("a@b.co"));
    assert!(is_valid_email("first.last@mail.example.org"));
    assert!(!is_valid_email("no-at.example.com"));
    assert!(!is_valid_email("user@nodot"));
    assert!(!is_valid_email("us er@example.com"));
    assert!(!is_valid_email("user@@example.com"));
}

#[test]
fn delivery_date_accepts_both_vendor_formats() {
    let expected = NaiveDate::from_ymd_opt(2026, 10, 21);
    assert_eq!(parse_delivery_date("2026-10-21"), expected);
    assert_eq!(parse_delivery_date("21.10.2026"), expected);
    assert_eq!(parse_delivery_date("2026-10-21T00:00:00"), expected);
    assert_eq!(parse_delivery_date("next tuesday"), None);
}

#[test]
fn complete_draft_becomes_new_order() {
    let order = complete_draft().to_new_order().expect("valid draft");
    assert_eq!(order.full_name, "Anna Petrova");
    assert_eq!(order.comment, "ring twice");
    assert_eq!(order.good_ids, vec![3, 8]);
    assert_eq!(order.delivery_date, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
}

#[test]
fn new_order_serializes_vendor_field_names() {
    let order = complete_draft().to_new_order().unwrap();
    let json = serde_json::to_value(&order).unwrap();
    assert_eq!(json["full_name"], "Anna Petrova");
    assert_eq!(json["delivery_address"], "Moscow, Bolshaya Semyonovskaya 38");
    assert_eq!(json["delivery_date"], "2026-10-21");
    assert_eq!(json["delivery_interval"], "18:00-22:00");
    assert_eq!(json["subscribe"], true);
    assert_eq!(json["good_ids"], serde_json::json!([3, 8]));
}

#[test]
fn empty_phone_is_reported() {
    let mut draft = complete_draft();
    draft.phone = "   ".to_string();
    let err = draft.to_new_order().unwrap_err();
    assert_eq!(
        err.0,
        vec![FieldError {
            field: OrderField::Phone,
            problem: FieldProblem::Missing
        }]
    );
    assert_eq!(err.to_string(), "order form is invalid: phone is required");
}

#[test]
fn every_failing_field_is_reported_in_form_order() {
    let draft = OrderDraft {
        email: "broken".to_string(),
        delivery_date: "someday".to_string(),
        ..OrderDraft::default()
    };
    let err = draft.to_new_order().unwrap_err();
    assert_eq!(
        err.fields(),
        vec![
            OrderField::Items,
            OrderField::Name,
            OrderField::Email,
            OrderField::Phone,
            OrderField::Address,
            OrderField::DeliveryDate,
            OrderField::DeliveryInterval,
        ]
    );
    assert!(err.0.contains(&FieldError {
        field: OrderField::Email,
        problem: FieldProblem::Malformed
    }));
}

#[test]
fn edit_does_not_require_items() {
    let mut draft = complete_draft();
    draft.items.clear();
    assert!(draft.to_new_order().unwrap_err().has(OrderField::Items));

    let patch = draft.to_patch().expect("edit should not need items");
    assert_eq!(patch.phone.as_deref(), Some("+7 900 000-00-00"));
    assert_eq!(patch.comment.as_deref(), Some("ring twice"));
}

#[test]
fn patch_serializes_only_set_fields() {
    let patch = OrderPatch {
        phone: Some("+7 999".to_string()),
        delivery_date: NaiveDate::from_ymd_opt(2026, 11, 2),
        ..OrderPatch::default()
    };
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "phone": "+7 999", "delivery_date": "2026-11-02" })
    );
    assert!(OrderPatch::default().is_empty());
    assert!(!patch.is_empty());
}

#[test]
fn order_parses_vendor_row_leniently() {
    let json = r#"{
        "id": 41,
        "full_name": "Ivan",
        "email": "ivan@example.com",
        "phone": "123",
        "subscribe": 1,
        "delivery_address": "Street 1",
        "delivery_date": "05.11.2026",
        "delivery_interval": "10:00-14:00",
        "comment": null,
        "good_ids": [1, 2],
        "created_at": "2026-10-01T12:30:00",
        "student_id": 9000
    }"#;
    let order: Order = serde_json::from_str(json).expect("valid order");
    assert!(order.subscribe);
    assert_eq!(order.delivery_date, NaiveDate::from_ymd_opt(2026, 11, 5));
    assert_eq!(order.comment, None);
    assert_eq!(order.total_price, None);
    assert!(order.created_at.is_some());
}

#[test]
fn order_tolerates_bad_dates() {
    let json = r#"{
        "id": 2,
        "full_name": "X",
        "email": "x@y.z",
        "phone": "1",
        "subscribe": false,
        "delivery_address": "A",
        "delivery_date": "garbage",
        "created_at": "also garbage"
    }"#;
    let order: Order = serde_json::from_str(json).expect("still parses");
    assert_eq!(order.delivery_date, None);
    assert_eq!(order.created_at, None);
    assert!(order.good_ids.is_empty());
}

#[test]
fn draft_round_trips_through_stored_order() {
    let order = Order {
        id: 5,
        full_name: "Ivan".to_string(),
        email: "ivan@example.com".to_string(),
        phone: "123".to_string(),
        subscribe: false,
        delivery_address: "Street 1".to_string(),
        delivery_date: NaiveDate::from_ymd_opt(2026, 12, 1),
        delivery_interval: "08:00-12:00".to_string(),
        comment: None,
        good_ids: vec![4],
        total_price: Some(1500),
        created_at: None,
    };
    let draft = OrderDraft::from_order(&order);
    assert_eq!(draft.delivery_date, "2026-12-01");
    assert_eq!(draft.comment, "");
    assert_eq!(draft.items, vec![4]);
    assert!(draft.to_patch().is_ok());
}

#[test]
fn apply_patch_touches_only_set_fields() {
    let mut order = Order {
        id: 12,
        full_name: "Anna Petrova".to_string(),
        delivery_address: "Moscow".to_string(),
        good_ids: vec![3, 8],
        ..Order::default()
    };
    let patch = OrderPatch {
        delivery_address: Some("Kazan".to_string()),
        subscribe: Some(true),
        ..OrderPatch::default()
    };

    order.apply_patch(&patch);

    assert_eq!(order.delivery_address, "Kazan");
    assert!(order.subscribe);
    assert_eq!(order.full_name, "Anna Petrova");
    assert_eq!(order.good_ids, vec![3, 8]);
}

#[test]
fn order_row_needs_only_an_id() {
    let order: Order = serde_json::from_str(r#"{"id": 5}"#).unwrap();
    assert_eq!(order.id, 5);
    assert!(order.full_name.is_empty());
    assert!(order.good_ids.is_empty());
    assert!(serde_json::from_str::<Order>("{}").is_err());
}
