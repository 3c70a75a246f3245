use super::*;

#[test]
fn parses_all_known_parameters() {
    let b = SizeBounds::default();
    let req = AvatarRequest::from_query(
        "?id=3&name=Darth+Vader&email=darthvader.fider%40gmail.com&size=120",
        &b,
    );
    assert_eq!(req.user_id, Some(3));
    assert_eq!(req.name, "Darth Vader");
    assert_eq!(req.email.as_deref(), Some("darthvader.fider@gmail.com"));
    assert_eq!(req.size.px(), 120);
}

#[test]
fn lenient_defaults_and_clamping() {
    let b = SizeBounds::default();

    let req = AvatarRequest::from_query("", &b);
    assert_eq!(req.user_id, None);
    assert_eq!(req.name, "");
    assert_eq!(req.email, None);
    assert_eq!(req.size.px(), 50);

    let req = AvatarRequest::from_query("id=abc&size=big&email=%20", &b);
    assert_eq!(req.user_id, None);
    assert_eq!(req.size.px(), 50);
    assert_eq!(req.email, None);

    assert_eq!(AvatarRequest::from_query("size=-5", &b).size.px(), 50);
    assert_eq!(AvatarRequest::from_query("size=0", &b).size.px(), 50);
    assert_eq!(AvatarRequest::from_query("size=4096", &b).size.px(), 200);
}

#[test]
fn last_repeated_key_wins_and_unknown_keys_are_ignored() {
    let b = SizeBounds::default();
    let req = AvatarRequest::from_query("name=a&name=Jon%20Snow&theme=dark&id=0", &b);
    assert_eq!(req.name, "Jon Snow");
    assert_eq!(req.user_id, Some(0));
}

#[test]
fn builder_clamps_size() {
    let b = SizeBounds::default();
    let req = AvatarRequest::new("Jon Snow", 10, &b)
        .with_user_id(7)
        .with_email("jon@example.com");
    assert_eq!(req.size.px(), 50);
    assert_eq!(req.user_id, Some(7));
    assert_eq!(req.email.as_deref(), Some("jon@example.com"));
}
