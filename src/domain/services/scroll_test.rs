use super::Scroll;

#[test]
fn it_stays_at_zero_when_content_fits() {
    let mut scroll = Scroll::default();
    scroll.set_state(5, 10);

    scroll.down();
    scroll.down_page();
    scroll.last();

    assert_eq!(scroll.position, 0);
}

#[test]
fn it_clamps_to_the_last_page() {
    let mut scroll = Scroll::default();
    scroll.set_state(30, 10);

    scroll.down_page();
    assert_eq!(scroll.position, 10);
    scroll.down_page();
    scroll.down_page();
    assert_eq!(scroll.position, 20);
    scroll.down();
    assert_eq!(scroll.position, 20);
}

#[test]
fn it_scrolls_back_up() {
    let mut scroll = Scroll::default();
    scroll.set_state(30, 10);
    scroll.last();

    scroll.up();
    assert_eq!(scroll.position, 19);
    scroll.up_page();
    assert_eq!(scroll.position, 9);
    scroll.up_page();
    assert_eq!(scroll.position, 0);
}

#[test]
fn it_reclamps_when_content_shrinks() {
    let mut scroll = Scroll::default();
    scroll.set_state(30, 10);
    scroll.last();

    scroll.set_state(12, 10);
    assert_eq!(scroll.position, 2);
}
