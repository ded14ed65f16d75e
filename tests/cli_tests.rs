#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;
    use ticksheet::*;

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_device_list() {
        let devices = handle_device_list();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0], "Mock Device 1");
        assert_eq!(devices[1], "Mock Device 2");
    }

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_valid_output_device() {
        let devices = handle_device_list();
        assert!(validate_device("Mock Device 1", &devices).is_ok());
        assert!(validate_device("Mock", &devices).is_ok());
    }

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_invalid_output_device() {
        let devices = handle_device_list();
        let err = validate_device("Nonexistent Device", &devices).unwrap_err();
        assert!(
            err.contains("Nonexistent Device"),
            "Error should name the missing device: {}",
            err
        );
    }

    #[test]
    fn test_args_without_command() {
        let args = Args::parse_from(["test"]);
        assert!(args.command.is_none());
        assert!(!args.device_list);
        assert_eq!(args.output_device, None);
    }

    #[test]
    fn test_device_list_flag() {
        let args = Args::parse_from(["test", "--device-list"]);
        assert!(args.device_list);
    }

    #[test]
    fn test_play_with_file_and_device() {
        let args = Args::parse_from([
            "test",
            "--output-device",
            "Mock Device 1",
            "play",
            "song.mid",
            "--dry-run",
        ]);
        assert_eq!(args.output_device.as_deref(), Some("Mock Device 1"));
        assert_eq!(
            args.command,
            Some(Command::Play {
                file: Some(PathBuf::from("song.mid")),
                random: false,
                pick: false,
                dry_run: true,
            })
        );
    }

    #[test]
    fn test_play_random_conflicts_with_file() {
        assert!(Args::try_parse_from(["test", "play", "song.mid", "--random"]).is_err());
        assert!(Args::try_parse_from(["test", "play", "--random", "--pick"]).is_err());
        assert!(Args::try_parse_from(["test", "play", "--random"]).is_ok());
    }

    #[test]
    fn test_stream_with_ceiling() {
        let args = Args::parse_from(["test", "--config", "alt.toml", "stream", "a.mid", "--max-tick", "96"]);
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(
            args.command,
            Some(Command::Stream {
                file: PathBuf::from("a.mid"),
                max_tick: Some(96),
            })
        );
    }

    #[test]
    fn test_instruments_and_random() {
        let args = Args::parse_from(["test", "instruments", "a.mid"]);
        assert_eq!(
            args.command,
            Some(Command::Instruments {
                file: PathBuf::from("a.mid")
            })
        );
        let args = Args::parse_from(["test", "random"]);
        assert_eq!(args.command, Some(Command::Random));
    }
}
