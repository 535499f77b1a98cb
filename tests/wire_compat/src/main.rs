fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use fbx_upload_protocol::{Acknowledgment, ControlMessage};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (key order is irrelevant).
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  device: {fixture}\n  Rust:   {reserialized}"
        );
    }

    /// Asserts that a document built in Rust serializes exactly like the fixture.
    fn matches_fixture(name: &str, msg: &ControlMessage) {
        let built: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(load_fixture(name), built, "built document differs from {name}");
    }

    // --- Control documents ---

    #[test]
    fn fixture_upload_start() {
        roundtrip_test::<ControlMessage>("upload_start.json");
    }

    #[test]
    fn fixture_upload_start_force() {
        roundtrip_test::<ControlMessage>("upload_start_force.json");
    }

    #[test]
    fn fixture_upload_finalize() {
        roundtrip_test::<ControlMessage>("upload_finalize.json");
    }

    #[test]
    fn built_upload_start_matches_device_format() {
        let msg = ControlMessage::upload_start(
            42,
            10_000,
            "/PauguySSD/Enregistrements",
            "test.txt",
            false,
        );
        matches_fixture("upload_start.json", &msg);

        let msg = ControlMessage::upload_start(
            42,
            10_000,
            "/PauguySSD/Enregistrements",
            "test.txt",
            true,
        );
        matches_fixture("upload_start_force.json", &msg);
    }

    #[test]
    fn built_upload_finalize_matches_device_format() {
        matches_fixture("upload_finalize.json", &ControlMessage::upload_finalize(42));
    }

    // --- Acknowledgments ---

    #[test]
    fn fixture_ack_success() {
        roundtrip_test::<Acknowledgment>("ack_success.json");
        let ack: Acknowledgment = serde_json::from_value(load_fixture("ack_success.json")).unwrap();
        assert!(ack.success);
    }

    #[test]
    fn fixture_ack_failure() {
        roundtrip_test::<Acknowledgment>("ack_failure.json");
        let ack: Acknowledgment = serde_json::from_value(load_fixture("ack_failure.json")).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.msg.as_deref(), Some("exists"));
    }
}
