use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use infoapi::datatype::{
    Info, InfoValue, NumberInfo, StringInfo, TimeInfo, World, WorldInfo, register_builtins,
};
use infoapi::interface::InfoApi;

fn moment(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2006, 1, 2)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn setup() -> InfoApi {
    let api = InfoApi::new();
    register_builtins(&api).expect("builtins register");
    api
}

struct Lobby;
impl World for Lobby {
    fn folder_name(&self) -> String {
        "lobby".to_string()
    }
    fn display_name(&self) -> String {
        "The Lobby".to_string()
    }
    fn time(&self) -> i64 {
        6000
    }
    fn seed(&self) -> i64 {
        -42
    }
}

#[test]
fn year_of_a_time_is_a_number() {
    let api = setup();
    let time = InfoValue::new(TimeInfo::new(moment(15, 4, 5)));
    let year = api.resolve(&time, "infoapi.time.year").expect("year");
    assert_eq!(year.downcast_ref::<NumberInfo>().unwrap().value(), 2006.0);
    assert_eq!(year.to_string(), "2006");
}

#[test]
fn every_time_part_resolves() {
    let api = setup();
    let time = InfoValue::new(TimeInfo::new(moment(15, 4, 5)));
    let expected = [
        ("infoapi.time.year", "2006"),
        ("infoapi.time.month", "1"),
        ("infoapi.time.date", "2"),
        ("infoapi.time.weekday", "Mon"),
        ("infoapi.time.hour", "15"),
        ("infoapi.time.minute", "4"),
        ("infoapi.time.second", "5"),
    ];
    for (name, value) in expected {
        assert_eq!(api.resolve_to_string(&time, name).as_deref(), Some(value), "{name}");
    }
    assert!(api.resolve(&time, "infoapi.time.elapsed").is_none());
}

#[test]
fn time_infos_document_themselves() {
    let api = setup();
    let infos = api.infos_of::<TimeInfo>();
    assert_eq!(infos.len(), 7);
    assert_eq!(infos[0].name(), Some("infoapi.time.year"));
    assert_eq!(
        infos[0].metadata_value("description").as_deref(),
        Some("The year part of a date")
    );
    assert_eq!(infos[0].metadata_value("example").as_deref(), Some("2006"));
    assert!(infos.iter().all(|info| info.metadata_value("example").is_some()));
}

#[test]
fn builtin_infos_display_like_the_template_expects() {
    assert_eq!(TimeInfo::new(moment(15, 4, 5)).to_string(), "2006-01-02 15:04:05");
    let fractional = NaiveDate::from_ymd_opt(2006, 1, 2)
        .unwrap()
        .and_hms_milli_opt(15, 4, 5, 500)
        .unwrap();
    assert_eq!(TimeInfo::new(fractional).to_string(), "2006-01-02 15:04:05.500");
    assert_eq!(NumberInfo::new(3.0).to_string(), "3");
    assert_eq!(NumberInfo::new(-1.25).to_string(), "-1.25");
    assert_eq!(StringInfo::new("hello").to_string(), "hello");
}

#[test]
fn world_infos_read_from_the_host_world() {
    let api = setup();
    let world = InfoValue::new(WorldInfo::new(Arc::new(Lobby)));
    assert_eq!(world.to_string(), "lobby");
    assert_eq!(api.resolve_to_string(&world, "infoapi.world.name").as_deref(), Some("lobby"));
    assert_eq!(
        api.resolve_to_string(&world, "infoapi.world.folderName").as_deref(),
        Some("lobby")
    );
    assert_eq!(
        api.resolve_to_string(&world, "INFOAPI.WORLD.DISPLAYNAME").as_deref(),
        Some("The Lobby")
    );
    assert_eq!(
        api.resolve_to_string(&world, "infoapi.world.customname").as_deref(),
        Some("The Lobby")
    );
    assert_eq!(api.resolve_to_string(&world, "infoapi.world.time").as_deref(), Some("6000"));
    assert_eq!(api.resolve_to_string(&world, "infoapi.world.seed").as_deref(), Some("-42"));
    assert_eq!(api.infos_of::<WorldInfo>().len(), 6);
}

struct Match {
    started: NaiveDateTime,
    arena: Option<Arc<dyn World>>,
}
impl Info for Match {
    const INFO_TYPE: &'static str = "match";
}
impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "match started {}", self.started)
    }
}

#[test]
fn plugin_infos_reach_builtins_through_edges_and_fallbacks() {
    let api = setup();
    // a third-party plugin that only knows about the builtins
    api.provide_fallback(|m: &Match| Some(TimeInfo::new(m.started)));
    api.provide_info("arena.world", |m: &Match| m.arena.clone().map(WorldInfo::new))
        .unwrap();

    let with_arena = InfoValue::new(Match {
        started: moment(20, 0, 0),
        arena: Some(Arc::new(Lobby)),
    });
    let without_arena = InfoValue::new(Match {
        started: moment(21, 30, 0),
        arena: None,
    });

    assert_eq!(
        api.resolve_to_string(&with_arena, "infoapi.time.hour").as_deref(),
        Some("20")
    );
    assert_eq!(
        api.resolve_to_string(&with_arena, "arena.world.infoapi.world.displayName").as_deref(),
        Some("The Lobby")
    );
    assert_eq!(
        api.resolve_to_string(&without_arena, "infoapi.time.minute").as_deref(),
        Some("30")
    );
    assert!(api.resolve(&without_arena, "arena.world.infoapi.world.name").is_none());
}
