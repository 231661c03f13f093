//! Line-oriented front end for editing and syncing amp settings.
//!
//! This is the collaborator the core was designed for: it holds the one
//! settings store, applies range-validated edits, and hands the store to
//! the sync session when the user asks.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use ampctl_net::{SyncError, SyncOutcome, SyncSession};
use ampctl_types::{AmpSettings, EffectKind, KnobTarget, SettingId};

pub fn run(addr: &str, timeout: Duration) -> io::Result<()> {
    let mut settings = AmpSettings::default();
    let mut session = SyncSession::new(addr, timeout);

    println!("ampctl (device {})", addr);
    println!("Type 'help' for commands. The first 'sync' pulls the amp's current settings.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !dispatch(line.trim(), &mut settings, &mut session) {
            break;
        }
    }
    Ok(())
}

/// Handle one command line. Returns false when the user quits.
fn dispatch(line: &str, settings: &mut AmpSettings, session: &mut SyncSession) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return false,
        ["help"] => print_help(),
        ["show"] => print_settings(settings),
        ["show", "json"] => match serde_json::to_string_pretty(settings) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("could not encode settings: {}", e),
        },
        ["set", key, value] => set_setting(settings, key, value),
        ["switch", slot, effect, state] => set_switch(settings, slot, effect, state),
        ["knob", slot, index] => set_knob(settings, slot, index),
        ["sync"] => run_sync(settings, session),
        _ => println!("unrecognized command; try 'help'"),
    }
    true
}

fn set_setting(settings: &mut AmpSettings, key: &str, value: &str) {
    let Some(id) = SettingId::from_key(key) else {
        println!("unknown setting {:?}; one of:", key);
        for id in SettingId::ALL {
            println!("  {}", id.key());
        }
        return;
    };

    // The filter flag reads naturally as on/off.
    let parsed = match (id, value) {
        (SettingId::FlangerFilterMode, "on") => Ok(1.0),
        (SettingId::FlangerFilterMode, "off") => Ok(0.0),
        _ => value.parse::<f64>(),
    };
    let Ok(parsed) = parsed else {
        println!("{:?} is not a number", value);
        return;
    };

    match settings.set(id, parsed) {
        Ok(()) => println!("{}", settings.display(id)),
        Err(e) => println!("rejected: {}", e),
    }
}

fn set_switch(settings: &mut AmpSettings, slot: &str, effect: &str, state: &str) {
    let slot = match slot.parse::<usize>() {
        Ok(n @ 1..=3) => n - 1,
        _ => {
            println!("footswitch number must be 1-3");
            return;
        }
    };
    let Some(effect) = EffectKind::from_name(effect) else {
        println!("unknown effect; one of: Tremolo, Distortion, Flanger, Echo, Reverb");
        return;
    };
    let on = match state {
        "on" => true,
        "off" => false,
        _ => {
            println!("expected 'on' or 'off'");
            return;
        }
    };
    settings.footswitches[slot].set(effect, on);
    println!("Footswitch {}: {}", slot + 1, settings.footswitches[slot]);
}

fn set_knob(settings: &mut AmpSettings, slot: &str, index: &str) {
    let slot = match slot.parse::<usize>() {
        Ok(n @ 1..=2) => n - 1,
        _ => {
            println!("knob number must be 1 or 2");
            return;
        }
    };
    let target = index
        .parse::<u8>()
        .ok()
        .and_then(KnobTarget::from_index);
    let Some(target) = target else {
        println!("assignment must be 0-11:");
        for target in KnobTarget::ALL {
            println!("  {:>2}  {}", target.index(), target.label());
        }
        return;
    };
    settings.knobs[slot] = target;
    println!("Knob {}: {}", slot + 1, target.label());
}

fn run_sync(settings: &mut AmpSettings, session: &mut SyncSession) {
    match session.sync(settings) {
        Ok(SyncOutcome::Applied) => {
            println!("Status OK");
            print_settings(settings);
        }
        Ok(SyncOutcome::Disconnected) => println!("Disconnected."),
        Err(SyncError::Protocol(e)) => println!("ERROR reading from amp: {}", e),
        Err(SyncError::Transport(e)) => println!("Connection failed: {}", e),
    }
}

fn print_settings(settings: &AmpSettings) {
    println!(
        "Tremolo     {} | {}",
        settings.display(SettingId::TremoloRate),
        settings.display(SettingId::TremoloDepth),
    );
    println!(
        "Distortion  {} | {}",
        settings.display(SettingId::DistortionGain),
        settings.display(SettingId::DistortionMix),
    );
    println!(
        "Flanger     {} | {} | {} | {}",
        settings.display(SettingId::FlangerSpeed),
        settings.display(SettingId::FlangerRange),
        settings.display(SettingId::FlangerColor),
        settings.display(SettingId::FlangerFilterMode),
    );
    println!(
        "Echo        {} | {}",
        settings.display(SettingId::EchoDelay),
        settings.display(SettingId::EchoFeedback),
    );
    println!(
        "Reverb      {} | {}",
        settings.display(SettingId::ReverbShimmer),
        settings.display(SettingId::ReverbDepth),
    );
    for (i, mask) in settings.footswitches.iter().enumerate() {
        println!("Footswitch {}: {}", i + 1, mask);
    }
    for (i, knob) in settings.knobs.iter().enumerate() {
        println!("Knob {}: {}", i + 1, knob.label());
    }
}

fn print_help() {
    println!("show                         print all settings");
    println!("show json                    print settings as JSON");
    println!("set <setting> <value>        e.g. 'set tremolo.rate 5.5', 'set flanger.filter on'");
    println!("switch <1-3> <effect> on|off assign an effect to a footswitch");
    println!("knob <1|2> <0-11>            assign a front-panel knob");
    println!("sync                         exchange settings with the amp");
    println!("quit                         leave");
}
