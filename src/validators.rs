pub struct Validator<'a, T: ?Sized>(&'a [(&'static str, &'a (dyn Fn(&T) -> bool + Sync))]);

impl<'a, T: ?Sized> Validator<'a, T> {
    pub fn run<U: AsRef<T>>(&self, value: U) -> Result<(), &'static str> {
        let Validator(sub_validators) = *self;
        for (message, validator) in sub_validators {
            if !validator(value.as_ref()) {
                return Err(message);
            }
        }
        Ok(())
    }
}

macro_rules! min {
    ($n: expr) => {
        |s| s.len() >= $n
    };
}

macro_rules! max {
    ($n: expr) => {
        |s| s.len() <= $n
    };
}

macro_rules! is_match {
    ($pattern: expr) => {
        |s| regex!($pattern).is_match(&*s)
    };
}

pub static PASSWORD: Validator<str> = Validator(&[
    ("Password length shall not be less than 8.", &min!(8)),
    ("Password length shall not be more than 128.", &max!(128)),
]);

pub static USERNAME: Validator<str> = Validator(&[
    ("Username length shall not be less than 3.", &min!(3)),
    ("Username length shall not be more than 32.", &max!(32)),
    (
        r#"Username can only contain letters, "_" and numbers."#,
        &is_match!(r#"^[\w_\d]+$"#),
    ),
]);

pub static EMAIL: Validator<str> = Validator(&[
    ("E-mail address length shall not be less than 5.", &min!(5)),
    ("E-mail address length shall not be more than 254.", &max!(254)),
    // How to validate an email address using a regular expression?
    // https://stackoverflow.com/q/201323
    ("Invalid e-mail address", &is_match!(r"^\S+@\S+\.\S+$")),
]);

/// Display names of campaigns, catalog entries and campaign children.
pub static TITLE: Validator<str> = Validator(&[
    ("Name shall not be empty.", &min!(1)),
    ("Name shall not be more than 128 characters.", &max!(128)),
]);

pub static DESCRIPTION: Validator<str> =
    Validator(&[("Description shall not be more than 4096 characters.", &max!(4096))]);

pub static CONTENT: Validator<str> =
    Validator(&[("Content shall not be more than 65535 characters.", &max!(65535))]);

pub static IMAGE_URL: Validator<str> = Validator(&[
    ("Image URL shall not be more than 1024 characters.", &max!(1024)),
    ("Image URL must start with http:// or https://", &is_match!(r"^https?://\S+$")),
]);

/// Codes are 10 characters from the URL-safe base64 alphabet.
pub static JOIN_CODE: Validator<str> = Validator(&[
    ("Join code must be 10 characters.", &(|s: &str| s.len() == 10)),
    ("Join code contains invalid characters.", &is_match!(r"^[A-Za-z0-9_-]+$")),
]);

pub static RARITIES: &[&str] = &["common", "uncommon", "rare", "very rare", "legendary", "artifact"];

pub static SCHOOLS: &[&str] = &[
    "abjuration",
    "conjuration",
    "divination",
    "enchantment",
    "evocation",
    "illusion",
    "necromancy",
    "transmutation",
];

pub static HIT_DICE: &[i16] = &[6, 8, 10, 12];

pub fn check_one_of<T: PartialEq>(value: &T, allowed: &[T], message: &'static str) -> Result<(), &'static str> {
    if allowed.contains(value) {
        Ok(())
    } else {
        Err(message)
    }
}

pub fn check_range<T: PartialOrd>(value: T, min: T, max: T, message: &'static str) -> Result<(), &'static str> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(message)
    }
}

#[test]
fn validator_test() {
    assert_eq!(PASSWORD.run("whoa!whoa!".to_string()), Ok(()));
    assert!(PASSWORD.run("whoa!").is_err());

    assert_eq!(USERNAME.run("whoa"), Ok(()));
    assert!(USERNAME.run("whoa whoa").is_err());
    assert!(USERNAME.run("").is_err());

    assert!(EMAIL.run("").is_err());
    assert!(EMAIL.run("example@example.com").is_ok());

    assert!(TITLE.run("Lost Mine of Phandelver").is_ok());
    assert!(TITLE.run("").is_err());

    assert!(IMAGE_URL.run("https://example.com/maps/phandalin.png").is_ok());
    assert!(IMAGE_URL.run("ftp://example.com/map.png").is_err());
}

#[test]
fn join_code_test() {
    assert!(JOIN_CODE.run("a1-b2_c3D4").is_ok());
    assert!(JOIN_CODE.run("short").is_err());
    assert!(JOIN_CODE.run("toolongtobeacode").is_err());
    assert!(JOIN_CODE.run("bad code!!").is_err());
}

#[test]
fn one_of_and_range_test() {
    assert!(check_one_of(&"rare", RARITIES, "bad rarity").is_ok());
    assert_eq!(check_one_of(&"mythic", RARITIES, "bad rarity"), Err("bad rarity"));
    assert!(check_one_of(&8i16, HIT_DICE, "bad die").is_ok());
    assert!(check_one_of(&7i16, HIT_DICE, "bad die").is_err());
    assert!(check_range(0i16, 0, 9, "bad level").is_ok());
    assert!(check_range(9i16, 0, 9, "bad level").is_ok());
    assert_eq!(check_range(10i16, 0, 9, "bad level"), Err("bad level"));
}
