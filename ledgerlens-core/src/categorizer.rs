//! Deterministic description → category mapping.
//!
//! Rules are checked top to bottom and the first keyword hit wins, so a
//! keyword that could belong to two categories lands in the earlier one.

use crate::transaction::Category;

// Keywords are matched as plain substrings, so each one must not occur inside
// an unrelated word ("rent" in "current", "cab" in "cable").
const RULES: &[(Category, &[&str])] = &[
    (
        Category::FoodAndDining,
        &[
            "zomato", "swiggy", "restaurant", "pizza", "coffee", "cafe", "dominos",
            "mcdonald", "kfc", "starbucks", "bakery", "grocery", "bigbasket", "blinkit",
            "zepto", "food", "dining",
        ],
    ),
    (
        Category::Transportation,
        &[
            "uber", "ola cabs", "olacabs", "rapido", "metro", "petrol", "fuel", "diesel",
            "fastag", "parking", "auto rickshaw", "cab ride", "taxi", "bus pass",
            "train ticket", "local train",
        ],
    ),
    (
        Category::Rent,
        &[
            "house rent", "monthly rent", "room rent", "rent paid", "rent payment",
            "landlord", "house owner", "pg charges", "maintenance charges",
        ],
    ),
    (
        Category::Travel,
        &[
            "irctc", "makemytrip", "goibibo", "cleartrip", "yatra", "airlines", "indigo",
            "air india", "vistara", "flight", "hotel", "oyo rooms", "airbnb", "travel",
        ],
    ),
    (
        Category::Shopping,
        &["amazon", "flipkart", "myntra", "ajio", "meesho", "nykaa", "shopping", "department store"],
    ),
    (
        Category::Subscriptions,
        &["netflix", "spotify", "prime video", "amazon prime", "hotstar", "youtube premium", "apple.com", "subscription"],
    ),
    (
        Category::Entertainment,
        &["bookmyshow", "pvr", "inox", "cinema", "movie", "concert", "gaming", "steam"],
    ),
    (
        Category::Education,
        &["school", "college", "university", "tuition", "course", "udemy", "coursera", "exam fee", "books"],
    ),
    (
        Category::Utilities,
        &[
            "electricity", "mobile", "bill", "recharge", "broadband", "wifi", "water",
            "gas cylinder", "airtel", "jio", "bsnl",
        ],
    ),
    (
        Category::Health,
        &["gym", "health", "hospital", "clinic", "pharmacy", "medical", "apollo", "doctor", "insurance"],
    ),
    (
        Category::Savings,
        &[
            "sip installment", "systematic investment", "mutual fund", "investment",
            "zerodha", "groww", "fixed deposit", "recurring deposit", "ppf",
        ],
    ),
    (
        Category::Income,
        &["salary", "bonus", "interest credit", "dividend", "refund", "cashback"],
    ),
];

/// Categorize a free-text description. Never fails; unmatched text is `Others`.
pub fn classify(description: &str) -> Category {
    let desc = description.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| desc.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Others)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_food() {
        assert_eq!(classify("Coffee Shop"), Category::FoodAndDining);
        assert_eq!(classify("UPI/ZOMATO LTD/Order"), Category::FoodAndDining);
    }

    #[test]
    fn test_classify_transport_and_rent() {
        assert_eq!(classify("Uber trip 4411"), Category::Transportation);
        assert_eq!(classify("Monthly rent March"), Category::Rent);
    }

    #[test]
    fn test_classify_income_and_savings() {
        assert_eq!(classify("SALARY CREDIT ACME"), Category::Income);
        assert_eq!(classify("SIP Axis Mutual Fund"), Category::Savings);
    }

    #[test]
    fn test_first_rule_wins() {
        // "food" (Food & Dining) beats "amazon" (Shopping)
        assert_eq!(classify("Amazon Fresh food order"), Category::FoodAndDining);
        // "train ticket" is Transportation even though "irctc" would be Travel
        assert_eq!(classify("IRCTC train ticket"), Category::Transportation);
    }

    #[test]
    fn test_keywords_do_not_match_inside_other_words() {
        assert_eq!(classify("Transfer to CURRENT A/C 1234"), Category::Others);
        assert_eq!(classify("Different amount adj"), Category::Others);
        assert_eq!(classify("TORRENT POWER electricity bill"), Category::Utilities);
        assert_eq!(classify("TOYOTA SERVICE"), Category::Others);
        assert_eq!(classify("Cable TV"), Category::Others);
        assert_eq!(classify("Small shop"), Category::Others);
        assert_eq!(classify("Please release hold"), Category::Others);
        assert_eq!(classify("Coca-Cola vending"), Category::Others);
    }

    #[test]
    fn test_unmatched_is_others() {
        assert_eq!(classify(""), Category::Others);
        assert_eq!(classify("NEFT XYZ 1234"), Category::Others);
    }

    #[test]
    fn test_classify_is_pure() {
        for d in ["Netflix", "electricity bill", "random text", "Gym membership"] {
            assert_eq!(classify(d), classify(d));
        }
    }

    #[test]
    fn test_rule_order_follows_taxonomy() {
        let order: Vec<Category> = RULES.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, Category::ALL[..Category::ALL.len() - 1].to_vec());
    }
}
