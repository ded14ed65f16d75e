use clap::{CommandFactory, Parser};
use std::path::Path;
use std::sync::Arc;
use ticksheet::{
    backend::{GeneralMidi, MidiOutputBackend, RecordingBackend},
    cli::{resolve_play_target, validate_device, Args, Command},
    config::Settings,
    handle_device_list, logging,
    midi::{parse_file, Midi},
    ui::{render_progress, ChannelProgress, ConsoleProgress},
    CancelToken, DedicatedThread, Executor, InstrumentTable, PlaybackOutcome, PlaybackReport,
    Player, Session, SoundBackend, WaitStrategy,
};

fn main() {
    let args = parse_command_line_arguments();
    let settings = load_settings(&args);
    initialize_logging(&settings);
    let devices = get_available_devices();

    if args.device_list {
        list_available_devices(&devices);
        return;
    }

    let output_device = args
        .output_device
        .clone()
        .or_else(|| settings.output_device.clone());

    match args.command {
        Some(Command::Play {
            file,
            random,
            pick,
            dry_run,
        }) => {
            let target = resolve_play_target(file.as_deref(), random, pick, &settings.songs_dir)
                .unwrap_or_else(|msg| fail(&msg));
            if dry_run {
                let backend = RecordingBackend::new(GeneralMidi.list_instruments());
                let (report, backend) = play_song(backend, &target, &settings);
                println!(
                    "Dry run: {} backend calls, {} notes over {} ticks",
                    backend.calls().len(),
                    report.notes_sent,
                    report.ticks
                );
            } else {
                if let Some(device_name) = &output_device {
                    if let Err(error_msg) = validate_device(device_name, &devices) {
                        fail(&error_msg);
                    }
                }
                let backend = MidiOutputBackend::new(output_device);
                play_song(backend, &target, &settings);
            }
        }
        Some(Command::Stream { file, max_tick }) => stream_song(&file, max_tick, &settings),
        Some(Command::Instruments { file }) => list_song_instruments(&file, &settings),
        Some(Command::Random) => {
            let session = Session::new(GeneralMidi);
            println!("{}", session.random_available_song(&settings.songs_dir));
        }
        None => {
            let _ = Args::command().print_help();
        }
    }
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn load_settings(args: &Args) -> Settings {
    Settings::load(args.config.as_deref())
        .unwrap_or_else(|e| fail(&format!("Error loading settings: {}", e)))
}

fn initialize_logging(settings: &Settings) {
    if let Err(e) = logging::init_logger(settings.level_filter()) {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Application starting");
}

fn get_available_devices() -> Vec<String> {
    handle_device_list()
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn play_song<B: SoundBackend + 'static>(
    backend: B,
    path: &Path,
    settings: &Settings,
) -> (PlaybackReport, B) {
    let midi = parse_file(path, &backend, settings.collision_policy)
        .unwrap_or_else(|e| fail(&format!("Error loading song: {}", e)));
    let strategy = settings.timing.strategy();

    match run_playback(backend, midi, strategy) {
        Ok((report, backend)) => {
            if report.outcome == PlaybackOutcome::Cancelled {
                println!("Playback cancelled after {} ticks", report.ticks);
            }
            for failure in &report.failures {
                eprintln!(
                    "Tick {}: {} not played: {}",
                    failure.tick, failure.pitch, failure.error
                );
            }
            (report, backend)
        }
        Err(msg) => fail(&msg),
    }
}

/// Plays on the clock thread while this thread draws the progress bar
fn run_playback<B: SoundBackend + 'static>(
    backend: B,
    midi: Midi,
    strategy: Arc<dyn WaitStrategy>,
) -> Result<(PlaybackReport, B), String> {
    let (sender, receiver) = crossbeam::channel::unbounded();
    let mut console = ConsoleProgress::new(midi.name());
    let cancel = CancelToken::new();

    let handle = DedicatedThread::new()
        .spawn(move || {
            let mut player = Player::with_strategy(backend, strategy);
            let mut progress = ChannelProgress::new(sender);
            let report = player.play(&midi, &mut progress, &cancel);
            report.map(|r| (r, player.into_backend()))
        })
        .map_err(|e| format!("Error starting playback thread: {}", e))?;

    render_progress(&receiver, &mut console);

    handle
        .join()
        .map_err(|_| "Error: playback thread panicked".to_string())?
        .map_err(|e| format!("Error during playback: {}", e))
}

fn stream_song(path: &Path, max_tick: Option<u64>, settings: &Settings) {
    let mut session = Session::with_options(
        GeneralMidi,
        settings.collision_policy,
        settings.timing.strategy(),
    );
    if let Some(ceiling) = max_tick {
        session.set_tick_ceiling(ceiling);
    }
    if !session.load_song(path) {
        fail(&format!("Error: could not load {}", path.display()));
    }

    let state = session.state();
    while state.has_ticks() {
        let batch = session.advance_tick();
        let tick = session.stream().current_tick().saturating_sub(1);
        for i in 0..batch.count {
            println!(
                "{:>8} {:<3} {:<5} {:>3} {}",
                tick, batch.kinds[i], batch.pitches[i], batch.velocities[i], batch.instruments[i]
            );
        }
    }
    session.wait_remainder_of_tick();
}

fn list_song_instruments(path: &Path, settings: &Settings) {
    let mut session = Session::with_options(
        GeneralMidi,
        settings.collision_policy,
        settings.timing.strategy(),
    );
    if !session.load_song(path) {
        fail(&format!("Error: could not load {}", path.display()));
    }
    loop {
        let (name, found) = session.next_needed_instrument();
        if !found {
            break;
        }
        println!("{}", name);
    }
}

fn fail(msg: &str) -> ! {
    log::error!("{}", msg);
    eprintln!("{}", msg);
    std::process::exit(1);
}
