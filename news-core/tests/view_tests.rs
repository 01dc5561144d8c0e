use std::collections::HashSet;

use news_core::{
    identity_key_for, shared_feed_state, Article, FeedHandle, FeedState, PLACEHOLDER_IMAGE_URL,
};

fn state_of(titles: &[&str]) -> FeedState {
    FeedState::with_articles(titles.iter().map(|t| Article::new(*t, "Wire")).collect())
}

fn view_titles(state: &FeedState) -> Vec<&str> {
    state.ordered_view().map(|a| a.title.as_str()).collect()
}

#[test]
fn pinned_articles_come_first_in_storage_order() {
    let mut state = state_of(&["a", "b", "c", "d", "e"]);
    // positions are view positions: pinning "b" moves it to the front
    state.toggle_pin(1);
    assert_eq!(view_titles(&state), ["b", "a", "c", "d", "e"]);
    state.toggle_pin(3);

    assert_eq!(view_titles(&state), ["b", "d", "a", "c", "e"]);
    let pinned: Vec<bool> = state.ordered_view().map(|a| a.pinned).collect();
    assert_eq!(pinned, [true, true, false, false, false]);
}

#[test]
fn toggle_pin_moves_only_the_target_between_partitions() {
    let mut state = state_of(&["a", "b", "c", "d"]);
    assert_eq!(state.toggle_pin(2), Some(true));
    assert_eq!(view_titles(&state), ["c", "a", "b", "d"]);

    // "c" is now at view position 0; unpinning restores the original order
    assert_eq!(state.toggle_pin(0), Some(false));
    assert_eq!(view_titles(&state), ["a", "b", "c", "d"]);
}

#[test]
fn toggle_pin_out_of_range_is_ignored() {
    let mut state = state_of(&["a"]);
    assert_eq!(state.toggle_pin(1), None);
    assert!(!state.articles()[0].pinned);
}

#[test]
fn delete_at_uses_view_positions() {
    let mut state = state_of(&["a", "b", "c", "d"]);
    state.toggle_pin(3);
    assert_eq!(view_titles(&state), ["d", "a", "b", "c"]);

    let removed = state.delete_at(2).unwrap();

    assert_eq!(removed.title, "b");
    assert_eq!(view_titles(&state), ["d", "a", "c"]);
    assert_eq!(state.len(), 3);
}

#[test]
fn delete_at_out_of_range_is_a_no_op() {
    let mut state = state_of(&["a", "b"]);
    assert!(state.delete_at(2).is_none());
    assert_eq!(view_titles(&state), ["a", "b"]);
}

#[test]
fn ordered_view_can_be_walked_again() {
    let mut state = state_of(&["a", "b", "c"]);
    state.toggle_pin(2);

    let view = state.ordered_view();
    let first: Vec<_> = view.clone().collect();
    let second: Vec<_> = view.collect();

    assert_eq!(first, second);
}

#[test]
fn identity_keys_are_unique_per_render_even_for_repeated_titles() {
    let state = state_of(&["same", "same", "other", "same"]);

    let keys: Vec<String> = state.keyed_view().into_iter().map(|(k, _)| k).collect();
    let unique: HashSet<&String> = keys.iter().collect();

    assert_eq!(unique.len(), keys.len());
    assert_eq!(keys[1], "same-1");
    assert_eq!(identity_key_for(&Article::new("x", "y"), 7), "x-7");
}

#[test]
fn prepend_keeps_slice_order_in_front() {
    let mut state = state_of(&["old"]);
    let added = state.prepend(vec![Article::new("n1", "W"), Article::new("n2", "W")], false);

    assert_eq!(added, 2);
    assert_eq!(view_titles(&state), ["n1", "n2", "old"]);
}

#[test]
fn missing_image_falls_back_to_placeholder() {
    let mut article = Article::new("t", "s");
    assert_eq!(article.image_or_placeholder(), PLACEHOLDER_IMAGE_URL);
    article.image_url = Some("https://img.example.com/a.png".into());
    assert_eq!(article.image_or_placeholder(), "https://img.example.com/a.png");
}

#[tokio::test]
async fn handle_mutations_are_visible_to_other_clones() {
    let feed = FeedHandle::new(shared_feed_state(state_of(&["a", "b", "c"])), 5);
    let other = feed.clone();

    assert_eq!(feed.toggle_pin(1).await, Some(true));
    assert_eq!(feed.delete_at(2).await.map(|a| a.title), Some("c".to_string()));

    let view: Vec<String> = other.ordered_view().await.into_iter().map(|a| a.title).collect();
    assert_eq!(view, ["b", "a"]);
    let keys: Vec<String> = other.keyed_view().await.into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["b-0", "a-1"]);
}
