use smokeflow::{Channels, Config, CpuBackend, FieldKind, GridResolution, Simulation};

#[test]
fn test_simulation_creation() {
    let sim = Simulation::new(CpuBackend::new(), Config::default(), [800, 600]);
    assert_eq!(
        sim.resolution(),
        GridResolution {
            width: 400,
            height: 300
        },
        "Default downsample halves the drawing buffer"
    );

    let fields = sim.fields();
    for kind in FieldKind::ALL {
        let surface = fields.current(kind);
        assert_eq!(surface.width(), 400, "{} width", kind.label());
        assert_eq!(surface.height(), 300, "{} height", kind.label());
        assert!(
            surface.texels().iter().all(|&v| v == 0.0),
            "{} should start cleared",
            kind.label()
        );
    }
}

#[test]
fn test_field_layouts() {
    let sim = Simulation::new(CpuBackend::new(), Config::default(), [64, 64]);
    let fields = sim.fields();
    assert_eq!(fields.velocity.read().channels(), Channels::Rg);
    assert_eq!(fields.density.read().channels(), Channels::Rgba);
    assert_eq!(fields.divergence.channels(), Channels::R);
    assert_eq!(fields.curl.channels(), Channels::R);
    assert_eq!(fields.pressure.read().channels(), Channels::R);

    assert!(FieldKind::Velocity.is_double_buffered());
    assert!(FieldKind::Density.is_double_buffered());
    assert!(FieldKind::Pressure.is_double_buffered());
    assert!(!FieldKind::Divergence.is_double_buffered());
    assert!(!FieldKind::Curl.is_double_buffered());
}

#[test]
fn test_binding_slots_are_distinct() {
    let sim = Simulation::new(CpuBackend::new(), Config::default(), [32, 32]);
    let fields = sim.fields();
    let mut slots = vec![
        fields.density.read().slot(),
        fields.density.write().slot(),
        fields.velocity.read().slot(),
        fields.velocity.write().slot(),
        fields.divergence.slot(),
        fields.curl.slot(),
        fields.pressure.read().slot(),
        fields.pressure.write().slot(),
    ];
    slots.sort_unstable();
    slots.dedup();
    assert_eq!(slots.len(), 8, "Every surface needs its own binding slot");
}

#[test]
fn test_grid_resolution_shift() {
    assert_eq!(
        GridResolution::from_drawing_buffer(800, 600, 0),
        GridResolution {
            width: 800,
            height: 600
        }
    );
    assert_eq!(
        GridResolution::from_drawing_buffer(801, 601, 2),
        GridResolution {
            width: 200,
            height: 150
        }
    );
    assert_eq!(
        GridResolution::from_drawing_buffer(3, 2, 4),
        GridResolution {
            width: 1,
            height: 1
        },
        "Resolution never drops below one texel"
    );
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.texture_downsample, 1);
    assert_eq!(config.density_dissipation, 0.98);
    assert_eq!(config.velocity_dissipation, 0.99);
    assert_eq!(config.pressure_dissipation, 0.8);
    assert_eq!(config.pressure_iterations, 25);
    assert_eq!(config.curl, 30.0);
    assert_eq!(config.splat_radius, 0.35);
    assert!(config.splat_on_hover);
    assert!(!config.ambient_splats);
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("smokeflow_config_{}.json", std::process::id()));

    let mut config = Config::default();
    config.curl = 12.5;
    config.pressure_iterations = 40;
    config.splat_on_hover = false;
    config.save(&path).expect("Config should save");

    let loaded = Config::load(&path).expect("Config should load");
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: Config = serde_json::from_str(r#"{ "curl": 5.0 }"#).expect("Partial config parses");
    assert_eq!(config.curl, 5.0);
    assert_eq!(config.pressure_iterations, 25);
    assert_eq!(config.splat_radius, 0.35);
}

#[test]
fn test_missing_config_is_an_error() {
    let result = Config::load(std::path::Path::new("/nonexistent/smokeflow.json"));
    assert!(matches!(result, Err(smokeflow::Error::Io(_))));
}
