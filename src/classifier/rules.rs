use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RARITY_GLYPH;
use crate::error::{AppError, Result};
use crate::types::Game;

/// Declarative category table. Matching logic lives in [`super::Classifier`];
/// this is data only, so it can be loaded from JSON and tested in isolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub rules: Vec<CategoryRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Filter tokens that select this category, e.g. `knife`, `knives`.
    pub names: Vec<String>,
    /// Phrases that put an item in the category.
    pub aliases: Vec<String>,
    /// Phrases that veto membership even if an alias matched.
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub special: Option<SpecialRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialRule {
    /// `guarded` phrases count only when the name also carries `glyph`.
    RarityGlyph { glyph: char, guarded: Vec<String> },
}

impl CategoryTable {
    pub fn builtin(game: Game) -> Self {
        let rules = match game {
            Game::Cs2 => cs2_rules(),
            Game::Dota2 => dota2_rules(),
            Game::Tf2 => tf2_rules(),
            Game::Rust => rust_rules(),
        };
        Self { rules }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let table: CategoryTable = serde_json::from_str(&text)?;
        if table.rules.iter().any(|r| r.names.is_empty()) {
            return Err(AppError::Config(format!(
                "{}: every category rule needs at least one name",
                path.display()
            )));
        }
        Ok(table)
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn rule(names: &[&str], aliases: &[&str], exclusions: &[&str]) -> CategoryRule {
    CategoryRule {
        names: list(names),
        aliases: list(aliases),
        exclusions: list(exclusions),
        special: None,
    }
}

// ---------------------------------------------------------------------------
// Counter-Strike 2
// ---------------------------------------------------------------------------

const CS2_WEAPON_EXCLUSIONS: &[&str] = &[
    "case", "key", "charm", "sticker", "souvenir", "patch", "graffiti",
];

const CS2_RIFLES: &[&str] = &[
    "ak-47", "m4a4", "m4a1-s", "aug", "sg 553", "famas", "galil ar",
];
const CS2_SNIPERS: &[&str] = &["awp", "ssg 08", "scar-20", "g3sg1"];
const CS2_PISTOLS: &[&str] = &[
    "glock-18", "usp-s", "p2000", "p250", "five-seven", "tec-9", "cz75-auto",
    "desert eagle", "dual berettas", "r8 revolver",
];
const CS2_SMGS: &[&str] = &["mac-10", "mp9", "mp7", "ump-45", "p90", "pp-bizon", "mp5-sd"];
const CS2_SHOTGUNS: &[&str] = &["nova", "xm1014", "sawed-off", "mag-7"];
const CS2_MACHINEGUNS: &[&str] = &["negev", "m249"];

fn cs2_rules() -> Vec<CategoryRule> {
    let mut rifles = list(CS2_RIFLES);
    rifles.extend(list(CS2_SNIPERS));

    vec![
        CategoryRule {
            names: list(&["knife", "knives"]),
            aliases: list(&[
                "knife", "bayonet", "karambit", "huntsman", "butterfly", "falchion",
                "bowie", "daggers", "stiletto", "talon", "ursus", "navaja", "kukri",
            ]),
            exclusions: list(&[
                "case", "weapon case", "key", "container", "package", "pack", "charm",
                "sticker", "souvenir", "pin", "patch", "music kit", "coin", "tag",
                "graffiti",
            ]),
            special: Some(SpecialRule::RarityGlyph {
                glyph: RARITY_GLYPH,
                guarded: list(&[
                    "flip", "gut", "shadow", "paracord", "survival", "nomad", "skeleton",
                    "classic",
                ]),
            }),
        },
        rule(
            &["gloves", "glove"],
            &["gloves", "hand wraps"],
            &["case", "key", "charm", "sticker", "souvenir", "patch"],
        ),
        CategoryRule {
            names: list(&["rifle", "rifles"]),
            aliases: rifles,
            exclusions: list(CS2_WEAPON_EXCLUSIONS),
            special: None,
        },
        rule(&["sniper", "snipers"], CS2_SNIPERS, CS2_WEAPON_EXCLUSIONS),
        rule(&["pistol", "pistols"], CS2_PISTOLS, CS2_WEAPON_EXCLUSIONS),
        rule(&["smg", "smgs"], CS2_SMGS, CS2_WEAPON_EXCLUSIONS),
        rule(&["shotgun", "shotguns"], CS2_SHOTGUNS, CS2_WEAPON_EXCLUSIONS),
        rule(&["machinegun", "machineguns", "heavy"], CS2_MACHINEGUNS, CS2_WEAPON_EXCLUSIONS),
        rule(&["ak"], &["ak-47"], CS2_WEAPON_EXCLUSIONS),
        rule(&["m4"], &["m4a4", "m4a1-s"], CS2_WEAPON_EXCLUSIONS),
        rule(&["deagle"], &["desert eagle"], CS2_WEAPON_EXCLUSIONS),
        rule(&["case", "cases"], &["case"], &["key"]),
        rule(&["sticker", "stickers"], &["sticker"], &[]),
        rule(&["charm", "charms"], &["charm"], &[]),
        rule(&["agent", "agents"], &["agent"], &["sticker", "patch"]),
    ]
}

// ---------------------------------------------------------------------------
// Dota 2
// ---------------------------------------------------------------------------

fn dota2_rules() -> Vec<CategoryRule> {
    vec![
        rule(&["arcana"], &["arcana"], &["fake", "replica"]),
        rule(&["immortal"], &["immortal"], &["fake", "replica"]),
        rule(&["legendary"], &["legendary"], &[]),
        rule(&["mythical"], &["mythical"], &[]),
        rule(&["courier", "couriers"], &["courier", "courrier"], &[]),
        rule(&["ward", "wards"], &["ward", "observer ward", "sentry ward"], &[]),
        rule(&["treasure"], &["treasure", "chest", "cache"], &[]),
        rule(&["bundle"], &["bundle", "set"], &[]),
        rule(&["loading"], &["loading screen"], &[]),
        rule(&["hud"], &["hud", "hud skin"], &[]),
        rule(&["music"], &["music pack"], &[]),
        rule(&["announcer"], &["announcer", "mega-kills"], &[]),
        rule(&["taunt"], &["taunt"], &[]),
        rule(
            &["hero"],
            &[
                "anti-mage", "axe", "juggernaut", "phantom assassin", "pudge", "invoker",
                "drow ranger", "crystal maiden", "lina", "mirana", "rubick", "sniper",
                "earthshaker", "sven", "tidehunter", "zeus", "kunkka", "legion commander",
            ],
            &[],
        ),
        rule(&["pa"], &["phantom assassin"], &[]),
        rule(&["sf"], &["shadow fiend"], &[]),
        rule(&["cm"], &["crystal maiden"], &[]),
        rule(&["jugg"], &["juggernaut"], &[]),
        rule(&["inscribed"], &["inscribed"], &[]),
        rule(&["autographed"], &["autographed", "autograph"], &[]),
        rule(&["genuine"], &["genuine"], &[]),
        rule(&["unusual"], &["unusual"], &[]),
        rule(
            &["ti"],
            &[
                "the international", "ti1", "ti2", "ti3", "ti4", "ti5", "ti6", "ti7", "ti8",
                "ti9", "ti10",
            ],
            &[],
        ),
        rule(&["compendium"], &["compendium", "battle pass"], &[]),
    ]
}

// ---------------------------------------------------------------------------
// Team Fortress 2
// ---------------------------------------------------------------------------

fn tf2_rules() -> Vec<CategoryRule> {
    vec![
        rule(&["unusual"], &["unusual"], &["strange unusual"]),
        rule(&["strange"], &["strange"], &[]),
        rule(&["genuine"], &["genuine"], &[]),
        rule(&["vintage"], &["vintage"], &[]),
        rule(&["haunted"], &["haunted"], &[]),
        rule(&["collector"], &["collector"], &[]),
        rule(&["decorated"], &["decorated"], &[]),
        rule(
            &["hat", "hats"],
            &["hat", "cap", "helm", "helmet", "mask", "bandana", "beret", "beanie"],
            &["weapon"],
        ),
        rule(&["misc"], &["misc", "badge", "medal", "pin"], &[]),
        rule(&["taunt", "taunts"], &["taunt"], &[]),
        rule(
            &["weapon", "weapons"],
            &[
                "weapon", "scattergun", "rocket launcher", "flamethrower", "grenade launcher",
                "stickybomb launcher", "minigun", "wrench", "medi gun", "sniper rifle", "smg",
                "knife", "revolver", "shotgun", "pistol", "bat", "bottle",
            ],
            &["taunt", "hat", "misc"],
        ),
        rule(&["paint"], &["paint", "paint can"], &[]),
        rule(&["tool"], &["tool", "name tag", "description tag", "gift wrap"], &[]),
        rule(&["crate"], &["crate", "case", "supply crate"], &["key"]),
        rule(&["key", "keys"], &["key"], &[]),
        rule(&["australium"], &["australium"], &[]),
        rule(&["killstreak"], &["killstreak"], &[]),
        rule(&["festive"], &["festive"], &[]),
        rule(&["botkiller"], &["botkiller", "bot killer"], &[]),
    ]
}

// ---------------------------------------------------------------------------
// Rust
// ---------------------------------------------------------------------------

fn rust_rules() -> Vec<CategoryRule> {
    vec![
        rule(
            &["weapon", "weapons"],
            &[
                "ak-47", "assault rifle", "lr-300", "mp5", "mp5a4", "thompson", "python",
                "revolver", "bolt action rifle", "m39", "semi-automatic rifle", "pump shotgun",
                "spas-12", "custom smg",
            ],
            &["door", "clothing", "armor"],
        ),
        rule(&["ak", "ak-47"], &["ak-47", "assault rifle"], &[]),
        rule(&["lr", "lr-300"], &["lr-300", "lr300"], &[]),
        rule(&["mp5"], &["mp5", "mp5a4"], &[]),
        rule(&["thompson"], &["thompson"], &[]),
        rule(&["bolt"], &["bolt action rifle"], &[]),
        rule(&["sword"], &["salvaged sword", "sword"], &[]),
        rule(&["axe"], &["salvaged axe", "stone hatchet", "hatchet"], &[]),
        rule(
            &["clothing"],
            &["pants", "shirt", "t-shirt", "hoodie", "jacket", "gloves", "boots", "shoes"],
            &["weapon", "door"],
        ),
        rule(&["hoodie"], &["hoodie"], &[]),
        rule(&["pants"], &["pants", "trousers"], &[]),
        rule(&["jacket"], &["jacket", "coat"], &[]),
        rule(&["gloves"], &["gloves", "tactical gloves"], &[]),
        rule(&["boots"], &["boots", "shoes"], &[]),
        rule(&["mask"], &["mask", "bandana", "balaclava", "facemask"], &[]),
        rule(&["hat"], &["hat", "cap", "beanie", "boonie"], &[]),
        rule(
            &["armor"],
            &["chestplate", "metal chest plate", "road sign", "facemask"],
            &[],
        ),
        rule(&["hazmat"], &["hazmat", "hazmat suit"], &[]),
        rule(
            &["door", "doors"],
            &["door", "sheet metal door", "armored door", "garage door"],
            &[],
        ),
        rule(&["building"], &["door", "wall", "foundation", "floor", "stairs", "roof"], &[]),
        rule(&["sign"], &["sign", "wooden sign", "neon sign"], &[]),
        rule(&["rug"], &["rug", "carpet"], &[]),
        rule(&["bed"], &["bed", "sleeping bag"], &[]),
        rule(&["tool"], &["pickaxe", "hatchet", "rock", "hammer"], &[]),
        rule(&["decoration"], &["sleeping bag", "rug", "painting", "frame"], &[]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_rule_is_named_and_nonempty() {
        for game in [Game::Cs2, Game::Dota2, Game::Tf2, Game::Rust] {
            for rule in CategoryTable::builtin(game).rules {
                assert!(!rule.names.is_empty(), "{game}: unnamed rule");
                assert!(
                    !rule.aliases.is_empty() || rule.special.is_some(),
                    "{game}: rule {:?} can never match",
                    rule.names
                );
            }
        }
    }

    #[test]
    fn only_cs2_knives_carry_the_glyph_rule() {
        let cs2 = CategoryTable::builtin(Game::Cs2);
        let knife = cs2
            .rules
            .iter()
            .find(|r| r.names.iter().any(|n| n == "knife"))
            .unwrap();
        assert!(matches!(
            knife.special,
            Some(SpecialRule::RarityGlyph { glyph: '★', .. })
        ));
        for game in [Game::Dota2, Game::Tf2, Game::Rust] {
            assert!(CategoryTable::builtin(game).rules.iter().all(|r| r.special.is_none()));
        }
    }

    #[test]
    fn table_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let table = CategoryTable::builtin(Game::Cs2);
        std::fs::write(&path, serde_json::to_string_pretty(&table).unwrap()).unwrap();

        assert_eq!(CategoryTable::from_json_file(&path).unwrap(), table);
    }

    #[test]
    fn json_rule_without_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(&path, r#"{"rules":[{"names":[],"aliases":["x"]}]}"#).unwrap();

        assert!(matches!(
            CategoryTable::from_json_file(&path),
            Err(AppError::Config(_))
        ));
    }
}
