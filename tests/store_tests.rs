//! Attribute store tests

use mt_metadata::{AttributeStore, MemoryStore, MetadataError, MetadataRecord};
use serde_json::json;

fn station() -> MetadataRecord {
    let mut station = MetadataRecord::for_entity("station").unwrap();
    station.set("id", "MT001").unwrap();
    station.set("geographic_name", "Mount Isa").unwrap();
    station.set("location.latitude", -20.7).unwrap();
    station.set("location.longitude", 139.5).unwrap();
    station.set("channels_recorded", "ex, ey").unwrap();
    station
}

mod attrs_tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let station = station();
        let mut store = MemoryStore::new();
        station.write_attrs(&mut store, "/Survey/Stations/MT001").unwrap();

        assert_eq!(
            store.get_attr("/Survey/Stations/MT001", "location.latitude").unwrap(),
            Some(json!(-20.7))
        );
        assert_eq!(
            store.attr_keys("/Survey/Stations/MT001").unwrap().len(),
            station.schema().len()
        );

        let back =
            MetadataRecord::from_store(station.schema().clone(), &store, "/Survey/Stations/MT001")
                .unwrap();
        assert_eq!(back, station);
    }

    #[test]
    fn test_text_attributes_are_coerced() {
        let mut store = MemoryStore::new();
        store.set_attr("/run", "id", json!("a")).unwrap();
        store.set_attr("/run", "sample_rate", json!("256")).unwrap();
        store
            .set_attr("/run", "channels_recorded_electric", json!("['ex', 'ey']"))
            .unwrap();

        let mut run = MetadataRecord::for_entity("run").unwrap();
        run.read_attrs(&store, "/run").unwrap();
        assert_eq!(run.get("sample_rate").unwrap(), &json!(256.0));
        assert_eq!(
            run.get("channels_recorded_electric").unwrap(),
            &json!(["ex", "ey"])
        );
        run.finalize().unwrap();
    }

    #[test]
    fn test_list_items_stored_as_json_text() {
        let mut store = MemoryStore::new();
        store.set_attr("/ch", "component", json!("ex")).unwrap();
        store
            .set_attr("/ch", "filters", json!(r#"[{"name": "dipole", "gain": 0.5}]"#))
            .unwrap();

        let mut channel = MetadataRecord::for_entity("channel").unwrap();
        channel.read_attrs(&store, "/ch").unwrap();
        assert_eq!(channel.get("filters").unwrap()[0]["gain"], json!(0.5));
    }

    #[test]
    fn test_invalid_attribute_is_rejected() {
        let mut store = MemoryStore::new();
        store.set_attr("/st", "location.latitude", json!("north")).unwrap();

        let mut station = MetadataRecord::for_entity("station").unwrap();
        let err = station.read_attrs(&store, "/st").unwrap_err();
        assert_eq!(err.path(), Some("location.latitude"));
    }

    #[test]
    fn test_missing_node() {
        let store = MemoryStore::new();
        let mut station = MetadataRecord::for_entity("station").unwrap();
        assert!(matches!(
            station.read_attrs(&store, "/missing"),
            Err(MetadataError::Store(_))
        ));
    }
}
