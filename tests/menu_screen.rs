//! End-to-end scenarios for a gamepad-driven audio config menu.
//!
//! Drives a realistic screen through the public API only: hover-driven
//! description switching, slider write-back with interpolated labels, radio
//! group selection, and D-pad navigation fed through the button adapter.

use rivet_ui::{
    ButtonPad, Buttons, Direction, HandlerTable, Screen, StateStore, UiEvent, Value,
};

const AUDIO_MENU: &str = r#"
    <menu>
        <row id="bgm_row" data-event-hover-enter="set_config_index(0)">
            <label>BGM Volume {{bgm_volume}}%</label>
            <slider id="bgm_volume_input" data-value="bgm_volume"
                    style="nav-down: #lhb_on"
                    data-event-value-changed="play_sound('slider')" />
        </row>
        <row id="lhb_row" data-event-hover-enter="set_config_index(1)">
            <label>Low Health Beep</label>
            <radio id="lhb_on" name="lhb" value="on" data-checked="lhb"
                   style="nav-up: #bgm_volume_input; nav-right: #lhb_off" />
            <radio id="lhb_off" name="lhb" value="off" data-checked="lhb"
                   style="nav-left: #lhb_on; nav-right: #lhb_na" />
            <radio id="lhb_na" name="lhb" value="na" data-checked="lhb"
                   style="nav-left: #lhb_off" />
        </row>
        <description data-if="cur_config_index == 0">Adjusts the background music volume.</description>
        <description data-if="cur_config_index == 1">Beeps when your health is low.</description>
    </menu>
"#;

fn handlers() -> HandlerTable {
    let mut table = HandlerTable::new();
    table.register("set_config_index", |store: &mut StateStore, args: &[Value]| {
        store.set("cur_config_index", args[0].clone());
    });
    table.register("play_sound", |_: &mut StateStore, _: &[Value]| {});
    table
}

fn audio_screen(table: HandlerTable) -> Screen {
    let mut screen = Screen::new(AUDIO_MENU, table).unwrap();
    screen.store_mut().set("bgm_volume", 80.0);
    screen.store_mut().set("lhb", "on");
    screen.store_mut().set("cur_config_index", 0.0);
    screen
}

fn visible_texts(frame: &rivet_ui::Frame) -> Vec<String> {
    frame
        .nodes()
        .iter()
        .filter_map(|n| n.text.clone())
        .collect()
}

#[test]
fn hover_switches_description_text() {
    let mut screen = audio_screen(handlers());
    let bgm_row = screen.template().node_by_name("bgm_row").unwrap();
    let lhb_row = screen.template().node_by_name("lhb_row").unwrap();

    let frame = screen.advance(&[UiEvent::HoverEnter(bgm_row)]);
    let texts = visible_texts(&frame);
    assert!(texts.iter().any(|t| t.contains("background music")));
    assert!(
        !texts.iter().any(|t| t.contains("health is low")),
        "only the hovered entry's description may show"
    );

    let frame = screen.advance(&[
        UiEvent::HoverLeave(bgm_row),
        UiEvent::HoverEnter(lhb_row),
    ]);
    let texts = visible_texts(&frame);
    assert!(texts.iter().any(|t| t.contains("health is low")));
    assert!(
        !texts.iter().any(|t| t.contains("background music")),
        "the previous description must disappear"
    );
}

#[test]
fn slider_write_back_updates_label_without_staleness() {
    let mut screen = audio_screen(handlers());
    let frame = screen.advance(&[]);
    assert!(visible_texts(&frame).iter().any(|t| t == "BGM Volume 80%"));

    let slider = screen.template().node_by_name("bgm_volume_input").unwrap();
    let frame = screen.advance(&[UiEvent::ValueChanged(slider, Value::Number(40.0))]);

    assert_eq!(screen.store().number("bgm_volume"), 40.0);
    let texts = visible_texts(&frame);
    assert!(
        texts.iter().any(|t| t == "BGM Volume 40%"),
        "label must show the new value, got {:?}",
        texts
    );
    assert!(
        !texts.iter().any(|t| t.contains("80%")),
        "stale percentage must never survive the write-back"
    );

    // And it stays correct on the following idle frame.
    let frame = screen.advance(&[]);
    assert!(visible_texts(&frame).iter().any(|t| t == "BGM Volume 40%"));
}

#[test]
fn radio_group_has_exactly_one_checked_after_any_selection() {
    let mut screen = audio_screen(handlers());
    screen.advance(&[]);

    for member in ["lhb_off", "lhb_na", "lhb_on"] {
        let node = screen.template().node_by_name(member).unwrap();
        let frame = screen.advance(&[UiEvent::ValueChanged(node, Value::Bool(true))]);

        let checked: Vec<&str> = frame
            .nodes()
            .iter()
            .filter(|n| n.checked == Some(true))
            .filter_map(|n| n.id.as_deref())
            .collect();
        assert_eq!(
            checked,
            vec![member],
            "selecting {} must check it and uncheck all siblings",
            member
        );
    }
}

#[test]
fn dpad_walks_the_declared_navigation_graph() {
    let mut screen = audio_screen(handlers());
    screen.advance(&[]);
    assert_eq!(screen.focused_id(), Some("bgm_volume_input"));

    let mut pad = ButtonPad::new();
    let feed = |screen: &mut Screen, pad: &mut ButtonPad, buttons: Buttons| {
        let events: Vec<UiEvent> = pad
            .press_edges(buttons)
            .into_iter()
            .map(UiEvent::Direction)
            .collect();
        screen.advance(&events);
    };

    feed(&mut screen, &mut pad, Buttons::DOWN);
    assert_eq!(screen.focused_id(), Some("lhb_on"));

    feed(&mut screen, &mut pad, Buttons::empty());
    feed(&mut screen, &mut pad, Buttons::RIGHT);
    assert_eq!(screen.focused_id(), Some("lhb_off"));

    feed(&mut screen, &mut pad, Buttons::empty());
    feed(&mut screen, &mut pad, Buttons::RIGHT);
    assert_eq!(screen.focused_id(), Some("lhb_na"));

    // No neighbor to the right of the last member: focus must not move.
    feed(&mut screen, &mut pad, Buttons::empty());
    feed(&mut screen, &mut pad, Buttons::RIGHT);
    assert_eq!(screen.focused_id(), Some("lhb_na"));

    // Holding a direction is a single press, not a repeat.
    feed(&mut screen, &mut pad, Buttons::empty());
    feed(&mut screen, &mut pad, Buttons::LEFT);
    feed(&mut screen, &mut pad, Buttons::LEFT);
    assert_eq!(screen.focused_id(), Some("lhb_off"));
}

#[test]
fn direction_input_with_no_neighbor_leaves_focus_unchanged() {
    let mut screen = audio_screen(handlers());
    screen.advance(&[]);

    screen.advance(&[UiEvent::Direction(Direction::Up)]);
    assert_eq!(screen.focused_id(), Some("bgm_volume_input"));
    screen.advance(&[UiEvent::Direction(Direction::Left)]);
    assert_eq!(screen.focused_id(), Some("bgm_volume_input"));
}

#[test]
fn missing_handler_degrades_without_breaking_bindings() {
    // Host forgot to register `play_sound`: the dispatch is skipped but the
    // two-way write-back and the rest of the frame still work.
    let mut table = HandlerTable::new();
    table.register("set_config_index", |store: &mut StateStore, args: &[Value]| {
        store.set("cur_config_index", args[0].clone());
    });
    let mut screen = audio_screen(table);
    screen.advance(&[]);

    let slider = screen.template().node_by_name("bgm_volume_input").unwrap();
    let lhb_row = screen.template().node_by_name("lhb_row").unwrap();
    let frame = screen.advance(&[
        UiEvent::ValueChanged(slider, Value::Number(25.0)),
        UiEvent::HoverEnter(lhb_row),
    ]);

    assert_eq!(screen.store().number("bgm_volume"), 25.0);
    assert!(
        visible_texts(&frame).iter().any(|t| t.contains("health is low")),
        "events after the unbound handler must still dispatch"
    );
}

#[test]
fn screens_are_independent() {
    // One screen failing to compile has no effect on a live screen.
    let mut good = audio_screen(handlers());
    let bad = Screen::new("<menu><unclosed>", HandlerTable::new());
    assert!(bad.is_err());

    let frame = good.advance(&[]);
    assert!(frame.by_name("bgm_volume_input").is_some());

    // Tearing one down is atomic: dropping is just dropping the value.
    drop(good);
}
