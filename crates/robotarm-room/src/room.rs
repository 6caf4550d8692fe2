use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use robotarm_core::config::SceneConfig;
use robotarm_core::{ArmError, ConfigError};
use robotarm_ik::{Chain, ElbowSolver};
use robotarm_trajectory::Trajectory;

use crate::controller::{Controller, TrackingController};

/// One robot's joint positions at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotFrame {
    pub name: String,
    pub time: f64,
    /// Base first, tail last.
    pub joint_positions: Vec<Point3<f64>>,
}

impl RobotFrame {
    /// Position of the tail joint.
    pub fn end_effector(&self) -> Point3<f64> {
        self.joint_positions[self.joint_positions.len() - 1]
    }
}

/// Outcome of one tick across every robot in a [`Room`].
///
/// Robots whose controller (or trace lookup) failed have no frame and no
/// trace point for this tick; their errors are kept in `failures`.
#[derive(Debug, Default)]
pub struct Tick {
    pub time: f64,
    /// Frames of the robots that stepped cleanly, in name order.
    pub frames: Vec<RobotFrame>,
    pub failures: Vec<(String, ArmError)>,
}

impl Tick {
    /// Whether every robot stepped cleanly.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Frame of robot `name`, if it stepped cleanly.
    pub fn frame(&self, name: &str) -> Option<&RobotFrame> {
        self.frames.iter().find(|frame| frame.name == name)
    }
}

struct Robot {
    chain: Chain,
    controller: Option<Box<dyn Controller>>,
}

/// Path of one joint per robot, accumulated tick by tick.
#[derive(Debug, Clone, Default)]
struct Trace {
    joint: isize,
    paths: BTreeMap<String, Vec<Point3<f64>>>,
}

/// A set of independently owned robot arms, stepped together.
///
/// Robots are updated in name order. Each robot only ever sees its own
/// chain, and a failing robot is skipped for that tick while the others
/// keep stepping.
#[derive(Default)]
pub struct Room {
    robots: BTreeMap<String, Robot>,
    trace: Option<Trace>,
}

impl Room {
    /// Empty room without tracing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the position of joint `joint` (negative counts from the tail)
    /// for every robot on every tick.
    #[must_use]
    pub fn with_trace(mut self, joint: isize) -> Self {
        self.trace = Some(Trace {
            joint,
            paths: BTreeMap::new(),
        });
        self
    }

    /// Build a room from a [`SceneConfig`]: one chain per arm, each tracking
    /// the scene trajectory with an elbow solver.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid or any arm cannot be built.
    pub fn from_config(config: &SceneConfig) -> Result<Self, ArmError> {
        config.validate()?;
        let trajectory = Trajectory::from_config(&config.trajectory)?;
        let solver = ElbowSolver::new(config.link_length)?;

        let mut room = Self::new();
        if let Some(joint) = config.trace_joint {
            room = room.with_trace(joint);
        }
        for arm in &config.arms {
            room.add_chain(&arm.name, Chain::from_config(arm)?)?;
            room.add_controls(
                &arm.name,
                TrackingController::new(trajectory.clone(), solver, config.elbow),
            )?;
        }
        Ok(room)
    }

    /// Add a robot whose base sits at `anchor`, rotated by `(theta, alpha)`.
    /// Returns the new chain so joints can be appended.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRobot`] if `name` is taken.
    pub fn add_robot(
        &mut self,
        name: &str,
        anchor: Vector3<f64>,
        theta: f64,
        alpha: f64,
    ) -> Result<&mut Chain, ConfigError> {
        self.add_chain(name, Chain::new(anchor, theta, alpha))
    }

    /// Add an already built chain under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRobot`] if `name` is taken.
    pub fn add_chain(&mut self, name: &str, chain: Chain) -> Result<&mut Chain, ConfigError> {
        if self.robots.contains_key(name) {
            return Err(ConfigError::DuplicateRobot(name.to_owned()));
        }
        debug!(robot = name, joints = chain.len(), "added robot");
        let robot = self.robots.entry(name.to_owned()).or_insert(Robot {
            chain,
            controller: None,
        });
        Ok(&mut robot.chain)
    }

    /// Attach `controller` to robot `name`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRobot`] if there is no such robot.
    pub fn add_controls(
        &mut self,
        name: &str,
        controller: impl Controller + 'static,
    ) -> Result<(), ConfigError> {
        let robot = self
            .robots
            .get_mut(name)
            .ok_or_else(|| ConfigError::UnknownRobot(name.to_owned()))?;
        debug!(robot = name, controller = controller.name(), "attached controller");
        robot.controller = Some(Box::new(controller));
        Ok(())
    }

    /// Chain of robot `name`.
    pub fn robot(&self, name: &str) -> Option<&Chain> {
        self.robots.get(name).map(|r| &r.chain)
    }

    /// Mutable chain of robot `name`, for manual joint edits between ticks.
    pub fn robot_mut(&mut self, name: &str) -> Option<&mut Chain> {
        self.robots.get_mut(name).map(|r| &mut r.chain)
    }

    /// Robot names in update order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.robots.keys().map(String::as_str)
    }

    /// Traced path of robot `name`, if tracing is enabled.
    pub fn trace(&self, name: &str) -> Option<&[Point3<f64>]> {
        self.trace
            .as_ref()
            .and_then(|trace| trace.paths.get(name))
            .map(Vec::as_slice)
    }

    /// Run one tick at `time`: apply every controller, then read back joint
    /// positions. A tick at `time == 0` clears the trace.
    ///
    /// A robot whose controller or trace lookup fails is reported in
    /// [`Tick::failures`] and gets neither a frame nor a trace point. Its
    /// chain keeps whatever the controller wrote before failing.
    #[allow(clippy::float_cmp)]
    pub fn update(&mut self, time: f64) -> Tick {
        if time == 0.0 {
            if let Some(trace) = &mut self.trace {
                trace.paths.clear();
            }
        }

        let mut tick = Tick {
            time,
            frames: Vec::with_capacity(self.robots.len()),
            failures: Vec::new(),
        };
        for (name, robot) in &mut self.robots {
            match step(robot, time, self.trace.as_ref().map(|t| t.joint)) {
                Ok((joint_positions, traced)) => {
                    if let (Some(trace), Some(point)) = (&mut self.trace, traced) {
                        trace.paths.entry(name.clone()).or_default().push(point);
                    }
                    tick.frames.push(RobotFrame {
                        name: name.clone(),
                        time,
                        joint_positions,
                    });
                }
                Err(err) => {
                    warn!(robot = %name, time, %err, "robot failed, skipping its frame");
                    tick.failures.push((name.clone(), err));
                }
            }
        }
        tick
    }

    /// Step through `times`, one [`Tick`] per entry.
    pub fn run(&mut self, times: &[f64]) -> Vec<Tick> {
        times.iter().map(|&time| self.update(time)).collect()
    }

    /// `count` evenly spaced tick times from `start` to `end` inclusive.
    #[allow(clippy::cast_precision_loss)]
    pub fn frames(start: f64, end: f64, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (count - 1) as f64;
                (0..count).map(|i| start + step * i as f64).collect()
            }
        }
    }
}

/// Run `robot`'s controller and read back its joint positions, plus the
/// traced joint when `trace_joint` is set.
fn step(
    robot: &mut Robot,
    time: f64,
    trace_joint: Option<isize>,
) -> Result<(Vec<Point3<f64>>, Option<Point3<f64>>), ArmError> {
    if let Some(controller) = &mut robot.controller {
        controller.control(time, &mut robot.chain)?;
    }
    let joint_positions = robot.chain.joint_positions();
    let traced = match trace_joint {
        Some(joint) => Some(joint_positions[robot.chain.resolve_index(joint)?]),
        None => None,
    };
    Ok((joint_positions, traced))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use approx::assert_relative_eq;
    use robotarm_core::config::{
        ArmConfig, ElbowPreference, FrameConfig, InterpolationMode, JointSpec, JointSpecKind,
        TrajectoryConfig, WaypointSpec,
    };
    use robotarm_core::{DomainError, IndexError};

    fn elbow_bot(room: &mut Room, name: &str) {
        let chain = room.add_robot(name, Vector3::zeros(), 0.0, 0.0).unwrap();
        chain.append_revolute(0.0, FRAC_PI_2).unwrap();
        chain.append_revolute(0.5, 0.0).unwrap();
        chain.append_revolute(0.5, -FRAC_PI_2).unwrap();
    }

    fn revolute(a: f64, alpha: f64) -> JointSpec {
        JointSpec {
            kind: JointSpecKind::Revolute,
            d: 0.0,
            theta: 0.0,
            a,
            alpha,
        }
    }

    #[test]
    fn duplicate_robot_name() {
        let mut room = Room::new();
        elbow_bot(&mut room, "ExampleBot");
        let err = room
            .add_robot("ExampleBot", Vector3::zeros(), 0.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRobot(_)));
        assert_eq!(room.robot("ExampleBot").unwrap().len(), 4);
    }

    #[test]
    fn controls_for_unknown_robot() {
        let mut room = Room::new();
        let err = room
            .add_controls("ghost", |_: f64, _: &mut Chain| -> Result<(), ArmError> { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRobot(name) if name == "ghost"));
    }

    #[test]
    fn update_without_controller_reads_positions() {
        let mut room = Room::new();
        elbow_bot(&mut room, "a");
        let frames = room.update(0.0).frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].joint_positions.len(), 4);
        assert_relative_eq!(frames[0].end_effector(), Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn robots_update_independently_in_name_order() {
        let mut room = Room::new();
        elbow_bot(&mut room, "b");
        elbow_bot(&mut room, "a");
        room.add_controls("a", |time: f64, chain: &mut Chain| -> Result<(), ArmError> {
            chain.set_joint_value(1, time)?;
            Ok(())
        })
        .unwrap();

        let frames = room.update(FRAC_PI_2).frames;
        let names: Vec<&str> = frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(room.robot("a").unwrap().joint_value(1).unwrap(), Some(FRAC_PI_2));
        assert_eq!(room.robot("b").unwrap().joint_value(1).unwrap(), Some(0.0));
        assert_relative_eq!(frames[0].end_effector(), Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn trace_records_and_resets() {
        let mut room = Room::new().with_trace(-1);
        elbow_bot(&mut room, "a");
        assert!(room.update(0.0).is_complete());
        assert!(room.update(1.0).is_complete());
        assert_eq!(room.trace("a").unwrap().len(), 2);
        room.update(0.0);
        assert_eq!(room.trace("a").unwrap().len(), 1);
        assert!(Room::new().trace("a").is_none());
    }

    #[test]
    fn trace_index_out_of_range() {
        let mut room = Room::new().with_trace(9);
        elbow_bot(&mut room, "a");
        let tick = room.update(0.0);
        assert!(tick.frames.is_empty());
        let (name, err) = &tick.failures[0];
        assert_eq!(name, "a");
        assert!(matches!(err, ArmError::Index(IndexError { index: 9, len: 4 })));
        assert!(room.trace("a").is_none());
    }

    #[test]
    fn failing_robot_does_not_stall_others() {
        let mut room = Room::new().with_trace(-1);
        elbow_bot(&mut room, "a");
        elbow_bot(&mut room, "b");
        room.add_controls("a", |_: f64, _: &mut Chain| -> Result<(), ArmError> {
            Err(DomainError::DegenerateReach.into())
        })
        .unwrap();
        room.add_controls("b", |time: f64, chain: &mut Chain| -> Result<(), ArmError> {
            chain.set_joint_value(1, time)?;
            Ok(())
        })
        .unwrap();

        let ticks = room.run(&[0.0, 1.0, 2.0]);
        assert_eq!(ticks.len(), 3);
        for tick in &ticks {
            assert!(!tick.is_complete());
            assert_eq!(tick.failures.len(), 1);
            assert_eq!(tick.failures[0].0, "a");
            assert!(tick.frame("a").is_none());
            assert_relative_eq!(tick.frame("b").unwrap().time, tick.time);
        }
        assert_eq!(room.robot("b").unwrap().joint_value(1).unwrap(), Some(2.0));
        assert!(room.trace("a").is_none());

        let trace_b = room.trace("b").unwrap();
        assert_eq!(trace_b.len(), 3);
        for (point, tick) in trace_b.iter().zip(&ticks) {
            assert_relative_eq!(*point, tick.frame("b").unwrap().end_effector());
        }
    }

    #[test]
    fn earlier_robot_is_not_traced_twice_when_later_fails() {
        let mut room = Room::new().with_trace(-1);
        elbow_bot(&mut room, "a");
        elbow_bot(&mut room, "b");
        room.add_controls("b", |_: f64, chain: &mut Chain| -> Result<(), ArmError> {
            chain.set_all_joint_values(&[None])?;
            Ok(())
        })
        .unwrap();

        let ticks = room.run(&[0.0, 1.0, 2.0]);
        let frames_a = ticks.iter().filter(|t| t.frame("a").is_some()).count();
        assert_eq!(frames_a, 3);
        assert_eq!(room.trace("a").unwrap().len(), frames_a);
        assert!(room.trace("b").is_none());
    }

    #[test]
    fn run_keeps_partial_ticks() {
        let mut room = Room::new();
        elbow_bot(&mut room, "a");
        room.add_controls("a", |time: f64, chain: &mut Chain| -> Result<(), ArmError> {
            if time > 1.5 {
                chain.set_all_joint_values(&[None])?;
            }
            Ok(())
        })
        .unwrap();

        let ticks = room.run(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(ticks.len(), 4);
        let complete: Vec<f64> = ticks.iter().filter(|t| t.is_complete()).map(|t| t.time).collect();
        assert_eq!(complete, vec![0.0, 1.0]);
        assert!(ticks[2].frames.is_empty());
        assert!(matches!(
            ticks[3].failures[0].1,
            ArmError::Config(ConfigError::JointCountMismatch { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn frames_are_evenly_spaced() {
        let times = Room::frames(0.0, 20.0, 201);
        assert_eq!(times.len(), 201);
        assert_relative_eq!(times[0], 0.0);
        assert_relative_eq!(times[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(times[200], 20.0, epsilon = 1e-12);
        assert_eq!(Room::frames(3.0, 5.0, 1), vec![3.0]);
        assert!(Room::frames(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn from_config_builds_tracking_arms() {
        let config = SceneConfig {
            link_length: 0.5,
            elbow: ElbowPreference::Down,
            frames: FrameConfig::default(),
            trace_joint: Some(-1),
            arms: vec![ArmConfig {
                name: "ExampleBot".into(),
                base_position: [0.0; 3],
                base_rotation: [0.0; 2],
                joints: vec![
                    revolute(0.0, FRAC_PI_2),
                    revolute(0.5, 0.0),
                    revolute(0.5, -FRAC_PI_2),
                ],
            }],
            trajectory: TrajectoryConfig {
                mode: InterpolationMode::Linear,
                waypoints: vec![
                    WaypointSpec {
                        position: [0.5, 0.0, 0.0],
                        time: 0.0,
                    },
                    WaypointSpec {
                        position: [-0.4, 0.4, 0.5],
                        time: 5.0,
                    },
                ],
            },
        };
        let mut room = Room::from_config(&config).unwrap();
        let frames = room.update(5.0).frames;
        assert_relative_eq!(frames[0].end_effector(), Point3::new(-0.4, 0.4, 0.5), epsilon = 1e-6);
        assert_eq!(room.trace("ExampleBot").unwrap().len(), 1);
        assert_eq!(room.names().collect::<Vec<_>>(), vec!["ExampleBot"]);
    }
}
