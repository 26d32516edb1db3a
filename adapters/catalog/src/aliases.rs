//! Community and deck-export spellings mapped onto canonical card names.

/// `(alias, canonical)` pairs registered by the standard catalog.
pub(crate) const STANDARD_ALIASES: &[(&str, &str)] = &[
    ("Archers", "Archer"),
    ("Bandit", "Assassin"),
    ("Guards", "SkeletonWarriors"),
    ("IceGolem", "IceGolemite"),
    ("Ice Golem", "IceGolemite"),
    ("Lumberjack", "AxeMan"),
    ("Hog Rider", "HogRider"),
    ("Mini P.E.K.K.A", "MiniPekka"),
    ("Mini P.E.K.K.A.", "MiniPekka"),
    ("The Log", "Log"),
    ("Lava Hound", "LavaHound"),
    ("Lava Pups", "LavaPups"),
    ("Battle Ram", "BattleRam"),
    ("Electro Wizard", "ElectroWizard"),
    ("Electro Dragon", "ElectroDragon"),
    ("Ice Wizard", "IceWizard"),
    ("Inferno Tower", "InfernoTower"),
    ("Royal Recruits", "RoyalRecruits"),
    ("Dark Prince", "DarkPrince"),
    ("Goblin Barrel", "GoblinBarrel"),
    ("Royal Ghost", "Ghost"),
    ("Wall Breakers", "Wallbreakers"),
    ("Ice Spirit", "IceSpirits"),
    ("Electro Spirit", "ElectroSpirit"),
    ("Mega Knight", "MegaKnight"),
    ("Magic Archer", "EliteArcher"),
    ("Archer Queen", "ArcherQueen"),
    ("Skeleton King", "SkeletonKing"),
];
