use tempfile::TempDir;

use super::*;

#[test]
fn test_register_rejects_missing_identity() {
    let registry = AgentRegistry::new();
    assert!(!registry.register_agent(AgentDefinition::new("", "has description")));
    assert!(!registry.register_agent(AgentDefinition::new("named", "  ")));
    assert!(registry.is_empty());
}

#[test]
fn test_reregistration_overwrites_without_duplicates() {
    let registry = AgentRegistry::new();
    registry.register_agent(AgentDefinition::new("helper", "first"));
    registry.register_agent(AgentDefinition::new("helper", "second"));
    registry.register_agent(AgentDefinition::new("another", "x"));

    assert_eq!(registry.get_definition("helper").unwrap().description, "second");

    let all = registry.get_all_definitions();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "another");
    assert_eq!(all.iter().filter(|d| d.name == "helper").count(), 1);
}

#[test]
fn test_builtins_are_valid() {
    let registry = AgentRegistry::with_builtins();
    assert!(registry.contains("codebase_investigator"));
    for definition in get_builtin_agents() {
        definition.validate().unwrap();
    }
}

#[test]
fn test_loader_reads_all_formats_and_skips_bad_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("a.toml"),
        "name = \"toml_agent\"\ndescription = \"from toml\"\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.yaml"),
        "name: yaml_agent\ndescription: from yaml\nrun_config:\n  max_turns: 3\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("c.json"),
        r#"{"name": "json_agent", "description": "from json"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("d.toml"), "name = [broken").unwrap();
    std::fs::write(dir.path().join("notes.md"), "# not an agent").unwrap();

    let loader = AgentLoader::new()
        .with_directory(dir.path())
        .with_directory(dir.path().join("missing"));
    let definitions = loader.load_all();

    let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["toml_agent", "yaml_agent", "json_agent"]);
    assert_eq!(definitions[1].run_config.max_turns, Some(3));
}

#[test]
fn test_loaded_definitions_shadow_builtins() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("investigator.toml"),
        "name = \"codebase_investigator\"\ndescription = \"project override\"\n",
    )
    .unwrap();

    let registry = AgentRegistry::with_builtins();
    let accepted = AgentLoader::new().with_directory(dir.path()).load_into(&registry);

    assert_eq!(accepted, 1);
    assert_eq!(
        registry.get_definition("codebase_investigator").unwrap().description,
        "project override"
    );
}
