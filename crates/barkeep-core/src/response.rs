//! Sentence construction for everything the bartender says about an order.
//!
//! Pure functions; no I/O.

use crate::menu::Menu;
use crate::resolver::ResolutionCase;

pub const UNAVAILABLE: &str = "I am sorry, we are not selling it here!";

pub const MINOR_ALL_ALCOHOL: &str =
    "Your order contains only alcoholic beverages and we cannot sell them to you because of your age!";

pub const MINOR_MIXED_PREFIX: &str =
    "We cannot sell you the alcoholic drinks you have ordered because of your age. However, ";

/// Join items for speech: "a", "a and b", "a, b, and c".
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(|s| s.as_ref()).collect();
    match items.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// "Your cola is coming right now!" / "Your cola and tea are coming right now!"
pub fn confirmation<S: AsRef<str>>(drinks: &[S]) -> String {
    let verb = if drinks.len() == 1 { "is" } else { "are" };
    format!("Your {} {} coming right now!", join_list(drinks), verb)
}

/// The answer to a resolved order.
pub fn answer<S: AsRef<str>>(drinks: &[S], available: bool, case: ResolutionCase) -> String {
    match case {
        ResolutionCase::NoAlcohol if !available || drinks.is_empty() => UNAVAILABLE.to_string(),
        ResolutionCase::NoAlcohol | ResolutionCase::AdultAllAlcohol => confirmation(drinks),
        ResolutionCase::MinorAllAlcohol => MINOR_ALL_ALCOHOL.to_string(),
        ResolutionCase::MinorMixed => {
            let mut tail = confirmation(drinks);
            // "Your" -> "your" after "However, "
            tail.replace_range(..1, "y");
            format!("{}{}", MINOR_MIXED_PREFIX, tail)
        }
    }
}

/// Age question naming the alcoholic drinks. `None` for an empty list.
pub fn age_prompt<S: AsRef<str>>(alcoholic: &[S]) -> Option<String> {
    let what = match alcoholic.len() {
        0 => return None,
        1 => "which is an alcoholic drink",
        _ => "which are alcoholic drinks",
    };
    Some(format!(
        "You have ordered {}, {}. Could you please tell me your age?",
        join_list(alcoholic),
        what
    ))
}

/// "Which kind of tea would you like? We sell black tea, jasmine, and green tea."
pub fn tea_prompt<S: AsRef<str>>(teas: &[S]) -> String {
    format!(
        "Which kind of tea would you like? We sell {}.",
        join_list(teas)
    )
}

/// Greeting that reads the menu aloud.
pub fn introduction(menu: &Menu) -> String {
    let mut s = String::from("Welcome to the bar. We can serve you hot and cold drinks as you wish! ");
    if !menu.hot().is_empty() {
        s.push_str(&format!("As a hot drink we have {}. ", join_list(menu.hot())));
    }
    if !menu.cold().is_empty() {
        s.push_str(&format!(
            "If you want a cold drink we can serve you {}. ",
            join_list(menu.cold())
        ));
    }
    s.push_str("What would you like to have?");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuConfig;

    #[test]
    fn joining_rule() {
        assert_eq!(join_list(&["cola"]), "cola");
        assert_eq!(join_list(&["cola", "tea"]), "cola and tea");
        assert_eq!(join_list(&["cola", "tea", "coffee"]), "cola, tea, and coffee");
        assert_eq!(
            join_list(&["a", "b", "c", "d"]),
            "a, b, c, and d"
        );
        assert_eq!(join_list::<&str>(&[]), "");
    }

    #[test]
    fn confirmations() {
        assert_eq!(answer(&["cola"], true, ResolutionCase::NoAlcohol), "Your cola is coming right now!");
        assert_eq!(
            answer(&["cola", "green tea"], true, ResolutionCase::NoAlcohol),
            "Your cola and green tea are coming right now!"
        );
        assert_eq!(
            answer(&["vodka", "rum"], true, ResolutionCase::AdultAllAlcohol),
            "Your vodka and rum are coming right now!"
        );
    }

    #[test]
    fn unavailable() {
        assert_eq!(answer::<&str>(&[], false, ResolutionCase::NoAlcohol), UNAVAILABLE);
    }

    #[test]
    fn minor_answers() {
        let all = answer::<&str>(&[], true, ResolutionCase::MinorAllAlcohol);
        assert_eq!(all, MINOR_ALL_ALCOHOL);
        assert!(!all.contains("vodka"));

        assert_eq!(
            answer(&["cola"], true, ResolutionCase::MinorMixed),
            "We cannot sell you the alcoholic drinks you have ordered because of your age. However, your cola is coming right now!"
        );
    }

    #[test]
    fn age_prompts() {
        assert_eq!(age_prompt::<&str>(&[]), None);
        assert_eq!(
            age_prompt(&["vodka"]).unwrap(),
            "You have ordered vodka, which is an alcoholic drink. Could you please tell me your age?"
        );
        assert_eq!(
            age_prompt(&["vodka", "rum"]).unwrap(),
            "You have ordered vodka and rum, which are alcoholic drinks. Could you please tell me your age?"
        );
        assert!(age_prompt(&["vodka", "rum", "brandy"])
            .unwrap()
            .starts_with("You have ordered vodka, rum, and brandy, which are"));
    }

    #[test]
    fn tea_prompt_lists_varieties() {
        assert_eq!(
            tea_prompt(&["black tea", "jasmine", "green tea"]),
            "Which kind of tea would you like? We sell black tea, jasmine, and green tea."
        );
    }

    #[test]
    fn introduction_reads_menu() {
        let menu = Menu::from_config(&MenuConfig::default()).unwrap();
        let s = introduction(&menu);
        assert!(s.starts_with("Welcome to the bar."));
        assert!(s.contains("americano, and espresso."));
        assert!(s.ends_with("What would you like to have?"));
    }
}
