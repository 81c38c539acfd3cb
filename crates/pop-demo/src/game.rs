//! Corridor game rules
//!
//! Integer-only, so a given sequence of control states always produces the
//! same stats.

use pop_dom::Key;

/// Lane positions run from 0 to this value inclusive
pub const LANE_WIDTH: i32 = 16;
/// Depth gained per tick moving forward
pub const FORWARD_SPEED: i32 = 4;
pub const BACK_SPEED: i32 = 2;
/// An armor bonus lies every this many depth units
pub const ARMOR_SPACING: i32 = 256;
pub const ARMOR_BONUS: i32 = 10;
pub const MAX_ARMOR: i32 = 200;
/// Slime stretches are the last quarter of every 512 units
pub const SLIME_PERIOD: i32 = 512;
/// Depth at which the mission exit sits
pub const EXIT_DEPTH: i32 = 4096;
pub const START_HEALTH: i32 = 100;
pub const START_AMMO: i32 = 50;

/// Keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl Controls {
    /// Update from a key transition; false if the key is not bound
    pub fn apply(&mut self, key: &Key, pressed: bool) -> bool {
        let slot = match key {
            Key::Character('w' | 'W') | Key::ArrowUp => &mut self.forward,
            Key::Character('s' | 'S') | Key::ArrowDown => &mut self.back,
            Key::Character('a' | 'A') | Key::ArrowLeft => &mut self.left,
            Key::Character('d' | 'D') | Key::ArrowRight => &mut self.right,
            Key::Space | Key::Control => &mut self.fire,
            _ => return false,
        };
        *slot = pressed;
        true
    }
}

/// Something worth a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Happening {
    BumpedWall,
    ArmorPickup,
    EnteredSlime,
    MissionComplete { mission: i32 },
    OutOfAmmo,
    Died,
}

impl Happening {
    pub fn message(&self) -> String {
        match self {
            Happening::BumpedWall => "Ouch! You bumped into a wall.".to_string(),
            Happening::ArmorPickup => "Picked up an armor bonus.".to_string(),
            Happening::EnteredSlime => "You stepped into nukage.".to_string(),
            Happening::MissionComplete { mission } => format!("Mission {mission} complete."),
            Happening::OutOfAmmo => "Out of ammo.".to_string(),
            Happening::Died => "You died.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub lane: i32,
    pub depth: i32,
    pub health: i32,
    pub armor: i32,
    pub ammo: i32,
    pub episode: i32,
    pub mission: i32,
    pub skill: i32,
    pub ticks: u64,
    in_slime: bool,
}

impl GameState {
    pub fn new(episode: i32, mission: i32, skill: i32) -> Self {
        Self {
            lane: LANE_WIDTH / 2,
            depth: 0,
            health: START_HEALTH,
            armor: 0,
            ammo: START_AMMO,
            episode,
            mission,
            skill,
            ticks: 0,
            in_slime: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn in_slime(&self) -> bool {
        self.in_slime
    }

    /// Armor soaks a third of incoming damage while it lasts
    pub fn take_damage(&mut self, amount: i32) {
        let saved = (amount / 3).min(self.armor);
        self.armor -= saved;
        self.health -= amount - saved;
    }

    /// Advance one tick under `controls`
    pub fn step(&mut self, controls: &Controls) -> Vec<Happening> {
        let mut out = Vec::new();
        if self.is_dead() {
            return out;
        }
        self.ticks += 1;

        let before = self.depth;
        if controls.forward {
            self.depth += FORWARD_SPEED;
        }
        if controls.back {
            self.depth = (self.depth - BACK_SPEED).max(0);
        }

        let steer = i32::from(controls.right) - i32::from(controls.left);
        let lane = self.lane + steer;
        if !(0..=LANE_WIDTH).contains(&lane) {
            self.take_damage(1 + self.skill);
            out.push(Happening::BumpedWall);
        } else {
            self.lane = lane;
        }

        if self.depth / ARMOR_SPACING > before / ARMOR_SPACING && self.armor < MAX_ARMOR {
            self.armor = (self.armor + ARMOR_BONUS).min(MAX_ARMOR);
            out.push(Happening::ArmorPickup);
        }

        let in_slime = self.depth % SLIME_PERIOD >= SLIME_PERIOD * 3 / 4;
        if in_slime && !self.in_slime {
            out.push(Happening::EnteredSlime);
        }
        self.in_slime = in_slime;
        if in_slime && self.ticks % 8 == 0 {
            self.take_damage(2 + self.skill);
        }

        if controls.fire && self.ticks % 4 == 0 && self.ammo > 0 {
            self.ammo -= 1;
            if self.ammo == 0 {
                out.push(Happening::OutOfAmmo);
            }
        }

        if self.depth >= EXIT_DEPTH {
            out.push(Happening::MissionComplete { mission: self.mission });
            self.mission += 1;
            self.depth = 0;
            self.in_slime = false;
        }

        if self.is_dead() {
            self.health = self.health.max(0);
            out.push(Happening::Died);
        }
        out
    }
}
