#[cfg(test)]
mod tests {
    use crate::{
        ArrangeSettings, ConfigService, DirectionSetting, Error, MemoryStore, ModeSetting, RonStore,
        split_keywords,
    };

    #[test]
    fn defaults_from_empty_store() {
        let s = ArrangeSettings::load(&MemoryStore::new()).unwrap();
        assert_eq!(s, ArrangeSettings::default());
        assert_eq!(s.sort, "title");
        assert_eq!(s.monitor.mode, ModeSetting::Template);
        assert_eq!((s.grid.rows, s.grid.cols), (2, 2));
        assert!(s.filter.title.is_empty());
    }

    #[test]
    fn reads_stored_values() {
        let mut store = MemoryStore::new();
        store.set("filter", "title", " Remote Desktop ,, full control").unwrap();
        store.set("filter", "process", "mstsc.exe").unwrap();
        store.set("monitor", "mode", "Snapshot").unwrap();
        store.set("monitor", "enabled", "1").unwrap();
        store.set("monitor", "interval_ms", "1500").unwrap();
        store.set("grid", "direction", "column").unwrap();
        store.set("grid", "rows", "3").unwrap();
        store.set("cascade", "x_offset", "-40").unwrap();

        let s = ArrangeSettings::load(&store).unwrap();
        assert_eq!(s.filter.title, vec!["Remote Desktop", "full control"]);
        assert_eq!(s.filter.process, vec!["mstsc.exe"]);
        assert_eq!(s.monitor.mode, ModeSetting::Snapshot);
        assert!(s.monitor.enabled);
        assert_eq!(s.monitor.interval_ms, 1500);
        assert_eq!(s.grid.direction, DirectionSetting::ColumnMajor);
        assert_eq!(s.grid.rows, 3);
        assert_eq!(s.cascade.x_offset, -40);
    }

    #[test]
    fn malformed_value_names_section_and_key() {
        let mut store = MemoryStore::new();
        store.set("grid", "cols", "three").unwrap();
        let err = ArrangeSettings::load(&store).unwrap_err();
        match err {
            Error::Validation { section, key, .. } => {
                assert_eq!(section, "grid");
                assert_eq!(key, "cols");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mut store = MemoryStore::new();
        store.set("notify", "hazards", "maybe").unwrap();
        assert!(ArrangeSettings::load(&store).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set("arrange", "sort", "   ").unwrap();
        store.set("grid", "rows", "").unwrap();
        let s = ArrangeSettings::load(&store).unwrap();
        assert_eq!(s.sort, "title");
        assert_eq!(s.grid.rows, 2);
    }

    #[test]
    fn save_then_load_through_ron_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");

        let mut s = ArrangeSettings::default();
        s.filter.title = vec!["RDP".into(), "full control".into()];
        s.filter.exclude_title = vec!["winarrange".into()];
        s.sort = "numeric".into();
        s.monitor.mode = ModeSetting::Snapshot;
        s.grid.direction = DirectionSetting::ColumnMajor;
        s.notify.corrections = true;

        let mut store = RonStore::load(&path).unwrap();
        s.save(&mut store).unwrap();
        store.save().unwrap();

        let back = ArrangeSettings::load(&RonStore::load(&path).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn keyword_split() {
        assert_eq!(split_keywords("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(split_keywords(" , ").is_empty());
    }
}
