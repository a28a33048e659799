// Demo flying a simulated drone: connection, settings push, a short flight and a link loss
//
// Run with RUST_LOG=info to see what the session does.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use drone_session::driver::{
    telemetry_channel, DeviceState, Driver, FlyingState, SettingRange, TelemetryEvent,
    VideoFrameRate, VideoResolution, VideoStreamMode,
};
use drone_session::subsystems::controls::{Button, StickInput};
use drone_session::subsystems::telemetry::ConnectionState;
use drone_session::{DroneSession, WaitFor};
use futures::StreamExt;
use log::info;
use tokio::time::sleep;

#[derive(Default)]
struct Settings {
    max_tilt: f32,
    max_distance: f32,
    max_altitude: f32,
    max_vertical_speed: f32,
    max_rotation_speed: f32,
}

/// Drone answering commands the way a Bebop does, through the telemetry channel
struct SimulatedDrone {
    events: flume::Sender<TelemetryEvent>,
    settings: Mutex<Settings>,
}

impl SimulatedDrone {
    fn report(&self, event: TelemetryEvent) {
        let _ = self.events.send(event);
    }

    fn report_settings(&self) {
        let settings = self.settings.lock().unwrap();
        self.report(TelemetryEvent::MaxTiltChanged(SettingRange::new(settings.max_tilt, 5.0, 35.0)));
        self.report(TelemetryEvent::MaxDistanceChanged(SettingRange::new(settings.max_distance, 10.0, 2000.0)));
        self.report(TelemetryEvent::MaxAltitudeChanged(SettingRange::new(settings.max_altitude, 2.5, 150.0)));
        self.report(TelemetryEvent::MaxVerticalSpeedChanged(SettingRange::new(
            settings.max_vertical_speed,
            0.5,
            6.0,
        )));
        self.report(TelemetryEvent::MaxRotationSpeedChanged(SettingRange::new(
            settings.max_rotation_speed,
            10.0,
            200.0,
        )));
    }
}

impl Driver for SimulatedDrone {
    fn connect(&self) {
        self.report(TelemetryEvent::ConnectionChanged(DeviceState::Running));
        self.report(TelemetryEvent::BatteryChanged(87));
        self.report_settings();
    }
    fn disconnect(&self) {
        self.report(TelemetryEvent::ConnectionChanged(DeviceState::Stopped));
    }
    fn emergency(&self) {
        self.report(TelemetryEvent::FlyingStateChanged(FlyingState::Emergency));
    }
    fn take_off(&self) {
        self.report(TelemetryEvent::FlyingStateChanged(FlyingState::TakingOff));
        self.report(TelemetryEvent::FlyingStateChanged(FlyingState::Hovering));
    }
    fn land(&self) {
        self.report(TelemetryEvent::FlyingStateChanged(FlyingState::Landing));
        self.report(TelemetryEvent::FlyingStateChanged(FlyingState::Landed));
    }
    fn take_picture(&self) {}
    fn start_recording_movie(&self, _start: bool) {}
    fn set_pitch(&self, pitch: i8) {
        let speed = pitch as f32 / 10.0;
        self.report(TelemetryEvent::SpeedChanged { vx: speed, vy: 0.0, vz: 0.0 });
    }
    fn set_roll(&self, _roll: i8) {}
    fn set_yaw(&self, _yaw: i8) {}
    fn set_gaz(&self, _gaz: i8) {}
    fn set_camera_orientation(&self, _tilt: i16, _pan: i16) {}
    fn piloting_go_home(&self, _start: bool) {}
    fn piloting_flat_trim(&self) {}
    fn settings_no_fly_over_max_distance(&self, _no_fly: bool) {}
    fn settings_max_tilt(&self, tilt: f32) {
        self.settings.lock().unwrap().max_tilt = tilt;
    }
    fn settings_max_distance(&self, distance: f32) {
        self.settings.lock().unwrap().max_distance = distance;
    }
    fn settings_max_altitude(&self, altitude: f32) {
        self.settings.lock().unwrap().max_altitude = altitude;
    }
    fn settings_max_vertical_speed(&self, speed: f32) {
        self.settings.lock().unwrap().max_vertical_speed = speed;
    }
    fn settings_max_rotation_speed(&self, speed: f32) {
        self.settings.lock().unwrap().max_rotation_speed = speed;
    }
    fn settings_outdoor(&self, outdoor: bool) {
        self.report(TelemetryEvent::WifiOutdoorChanged(outdoor));
    }
    fn settings_banked_turn(&self, banked_turn: bool) {
        self.report(TelemetryEvent::BankedTurnChanged(banked_turn));
    }
    fn settings_return_home_delay(&self, delay: u32) {
        // Last step of the settings push, acknowledge everything
        info!("Simulated drone acknowledges the settings");
        self.report(TelemetryEvent::ReturnHomeDelayChanged(delay));
        self.report_settings();
    }
    fn settings_video_stabilization(&self, roll: bool, pitch: bool) {
        self.report(TelemetryEvent::StabilizationChanged { roll, pitch });
    }
    fn settings_video_frame_rate(&self, frame_rate: VideoFrameRate) {
        self.report(TelemetryEvent::VideoFrameRateChanged(frame_rate));
    }
    fn settings_video_stream_mode(&self, _mode: VideoStreamMode) {}
    fn settings_video_recording_mode(&self, _best_quality: bool) {}
    fn settings_video_recording_resolution(&self, _resolution: VideoResolution) {}
    fn has_camera(&self) -> bool {
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let (events, receiver) = telemetry_channel();
    let drone = Arc::new(SimulatedDrone {
        events: events.clone(),
        settings: Default::default(),
    });

    let session = DroneSession::connect(drone, receiver).await?;

    let mut flying_states = session.telemetry.flying_state.watch_distinct();
    tokio::spawn(async move {
        while let Some(state) = flying_states.next().await {
            info!("Flying state: {:?}", state);
        }
    });

    session
        .telemetry
        .connection_state
        .wait_for(|state| *state == ConnectionState::Connected)
        .await?;
    println!("Connected, battery {}%", session.telemetry.battery.get());

    // Outdoor mode is part of the settings push, then wait for the drone to acknowledge it
    session.telemetry.wifi_outdoor.wait_for(|outdoor| *outdoor).await?;
    session.telemetry.sending_settings.wait_for(|sending| !sending).await?;
    println!("Settings pushed: {:?}", session.negotiator.target()?);

    session.controls.button(Button::A, true)?;
    session.controls.button(Button::A, false)?;
    session.telemetry.airborne.wait_for(|airborne| *airborne).await?;
    println!("Airborne");

    for _ in 0..10 {
        session.controls.sticks(StickInput {
            right_y: 0.4,
            ..Default::default()
        })?;
        sleep(Duration::from_millis(100)).await;
    }
    println!("Speed {:.1} km/h", session.telemetry.horizontal_speed_kmh());
    session.controls.sticks(StickInput::default())?;

    session.controls.button(Button::A, true)?;
    session.controls.button(Button::A, false)?;
    session
        .telemetry
        .flying_state
        .wait_for(|state| *state == FlyingState::Landed)
        .await?;
    println!("Landed");

    // Simulate a link loss, the session ends on the next liveness check
    events.send(TelemetryEvent::ConnectionChanged(DeviceState::Stopped))?;
    session.wait_exit_flying().await;
    println!("Link lost, session over");

    Ok(())
}
