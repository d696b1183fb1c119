use polar_mk::polar::Encoder;
use polar_mk::PolarConfig;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("polar_mk_{}_{}.toml", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_from_file_and_encode() {
    let path = write_temp(
        "file",
        r#"
        [polar]
        k = 4
        n = 8
        info_positions = [3, 5, 6, 7]
        "#,
    );
    let cfg = PolarConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let enc = cfg.build_encoder::<u8>().unwrap();
    assert_eq!(enc.info_bits_pos(), &[3, 5, 6, 7]);
    // rows 3, 5, 6 and 7 of the Arikan F^{⊗3}
    assert_eq!(enc.encode_to_vec(&[1, 0, 0, 0]).unwrap(), vec![1, 1, 1, 1, 0, 0, 0, 0]);
    assert_eq!(enc.encode_to_vec(&[0, 0, 0, 1]).unwrap(), vec![1; 8]);
}

#[test]
fn missing_file_is_an_error() {
    let path = std::env::temp_dir().join("polar_mk_does_not_exist.toml");
    assert!(PolarConfig::from_file(&path).is_err());
}

#[test]
fn out_of_range_positions_are_rejected() {
    let cfg = "[polar]\nk = 1\nn = 4\ninfo_positions = [4]\n";
    assert!(PolarConfig::from_toml(cfg).is_err());
}
