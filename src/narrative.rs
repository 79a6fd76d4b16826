//! Mission briefings, hints and sample queries shown to the player.
//!
//! Sample queries teach SQL patterns without revealing answers. They carry no
//! `--` comments because the query gate rejects those.

use crate::stage::Stage;

/// A member of the cast, shown alongside a stage briefing
pub struct Character {
    pub name: &'static str,
    pub role: &'static str,
    pub description: &'static str,
}

pub static COMMANDER: Character = Character {
    name: "Commander Hayes",
    role: "Your mission director at Central Command",
    description: "A veteran intelligence officer with 25 years of experience. Known for his calm demeanor in crisis situations.",
};

pub static TECH_SPECIALIST: Character = Character {
    name: "Dr. Eliza Chen",
    role: "Technical Specialist",
    description: "The agency's leading expert on explosive devices and database forensics. She provides technical guidance throughout your mission.",
};

pub static FIELD_OPERATIVE: Character = Character {
    name: "Agent Rodriguez",
    role: "Field Operative",
    description: "Your eyes on the ground. Rodriguez is at the bomb sites, relaying information back to you as you work to solve the case.",
};

/// Target profile, shown with every briefing
pub static VILLAIN: Character = Character {
    name: "The Ace of Spades",
    role: "Terrorist Organization",
    description: "A sophisticated cyber-terrorist group known for combining explosive devices with digital triggers. They've evaded capture for years.",
};

pub struct StageBrief {
    pub title: &'static str,
    /// Who delivers this stage's briefing
    pub character: &'static Character,
    pub description: &'static str,
    pub story: &'static str,
    pub hint: &'static str,
    pub sample_caption: &'static str,
    pub sample_query: &'static str,
    pub verification_question: &'static str,
}

pub const MISSION_INTRO: &str = "\
The Ace of Spades terrorist organization has planted bombs across the city.
Only one of them is real. Query the intelligence database to find it, defuse
it, and bring the person who planted it to justice before the clock runs out.";

static BRIEFS: [StageBrief; 3] = [
    StageBrief {
        title: "Identify the Real Bomb",
        character: &COMMANDER,
        description: "There are multiple bombs planted across the city. Use SQL queries to analyze the data and identify the real explosive device.",
        story: "\
Agent, this is Commander Hayes from Central Command. We've detected multiple
explosive devices across the city, but our intel suggests only one is real.
The others are decoys designed to waste our time.

The Ace of Spades cell is known for its signature design: cutting-edge
components with high signal strength and battery levels, a consistent
frequency pattern to ensure detonation, and a unique device signature code.

Their bombs are always serviced right before deployment, usually within 24
hours. The maintenance timestamp will tell you when each one was last touched.",
        hint: "\
INTELLIGENCE REPORT #A-7: real bombs always have signal strength above 95,
battery levels above 90, and a perfectly consistent frequency pattern (all
values identical). Device signatures typically start with 'B9Z'. Check the
maintenance log for activity within the last day or two.",
        sample_caption: "Finding patterns in data",
        sample_query: "\
SELECT location, signal_strength, battery_level, frequency_pattern
FROM bombs
WHERE signal_strength > 80 AND battery_level > 60
ORDER BY signal_strength DESC;",
        verification_question: "Which location contains the real bomb? (Enter the exact location)",
    },
    StageBrief {
        title: "Defuse the Bomb",
        character: &TECH_SPECIALIST,
        description: "You've found the bomb! Now analyze its components to discover the defusal passcode.",
        story: "\
Excellent work locating the real bomb, Agent. The disposal team is on site,
but they need your help to disarm the device safely.

The bomb has several components. Our specialists believe the deactivation
mechanism is wired to either the detonator or the main circuit board. Each
component has an activation code, but only one will disarm the bomb.

The Ace of Spades always uses premium materials for the parts that control
deactivation, typically titanium or gold. Everything else is cheap.",
        hint: "\
FIELD REPORT #C-12: look for components made of titanium or gold on the bomb
you identified. The defusal code is in the activation_code field of either
the Detonator or the Circuit component. Be precise.",
        sample_caption: "Analyzing relationships between entities",
        sample_query: "\
SELECT bc.component_name, bc.material, bc.activation_code
FROM bomb_components bc
JOIN bombs b ON bc.bomb_id = b.bomb_id
WHERE b.location = 'Train Station'
AND bc.material IN ('Steel', 'Copper');",
        verification_question: "What is the defusal code for the bomb? (Enter the exact code)",
    },
    StageBrief {
        title: "Find the Culprit",
        character: &FIELD_OPERATIVE,
        description: "The bomb has technical fingerprints. Trace them back to the suspect using the access records.",
        story: "\
The bomb is defused! Now we need to catch whoever planted it before they
leave the city.

Every interaction with a device is recorded in the access logs, together
with the action performed. Whoever performed the 'Installation' on our
target bomb is the person we want. Cross-reference the logs with the suspect
database and find the name of the person who planted the bomb at the Airport.",
        hint: "\
CONFIDENTIAL MEMO #F-23: join suspects with access_logs and filter for the
bomb_id you identified in Stage 1. The action_performed field shows
'Installation' for the person who planted the device.",
        sample_caption: "Complex multi-table join with filtering",
        sample_query: "\
SELECT s.name, s.access_level, a.action_performed, b.location
FROM suspects s
JOIN access_logs a ON s.suspect_id = a.suspect_id
JOIN bombs b ON a.bomb_id = b.bomb_id
WHERE s.access_level >= 3
AND a.access_time > '2025-03-01'
ORDER BY a.access_time DESC;",
        verification_question: "Who is the culprit behind the bomb? (Enter the exact name)",
    },
];

/// Briefing for a playable stage
pub fn brief(stage: Stage) -> Option<&'static StageBrief> {
    stage
        .number()
        .map(|n| &BRIEFS[usize::from(n) - 1])
}

/// Mission report shown on completion
pub fn debriefing(elapsed: &str) -> String {
    format!(
        "\
CLASSIFIED COMMUNICATION - MISSION REPORT
From: Commander Hayes, Counter-Terrorism Unit
Subject: Operation Card Shark - SUCCESSFUL

Our database specialist completed every objective of Operation Card Shark in {elapsed}.
The real bomb was found at the Airport, disarmed with the correct activation
code, and Sarah Connor, a known associate of the Ace of Spades, is in custody."
    )
}
