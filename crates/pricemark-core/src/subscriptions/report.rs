use std::fmt::Write as _;

use serde::Serialize;

use super::{BillingInterval, Subscription};

const APP_BAR_CELLS: f64 = 25.0;
const CATEGORY_BAR_CELLS: f64 = 6.0;
const SCHEDULE_BAR_CELLS: f64 = 30.0;
const SHARE_BAR_CELLS: f64 = 8.0;

const CATEGORY_ICONS: [&str; 10] = ["📺", "💼", "🎮", "🎵", "☁️", "📚", "🛒", "🏃", "📱", "🎨"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const TEMPLATE_HINT: &str = "⚠️ No subscription notes found. Tag notes as subscriptions and use the template:

# App Name
Preis/Monat: 19.99
Preis/Jahr: 239.88
Kategorie: Streaming
Abo seit: 2024-01-01

> Notes
";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppCost {
    pub name: String,
    pub category: String,
    pub interval: BillingInterval,
    pub price: f64,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCost {
    pub name: String,
    pub monthly_cost: f64,
    pub share_percent: f64,
}

/// A single amount billed in some month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charge {
    pub name: String,
    pub amount: f64,
    pub interval: BillingInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCharges {
    pub month: &'static str,
    pub total: f64,
    /// Highest amount first.
    pub charges: Vec<Charge>,
}

impl MonthCharges {
    fn yearly_total(&self) -> f64 {
        self.charges
            .iter()
            .filter(|charge| charge.interval == BillingInterval::Yearly)
            .map(|charge| charge.amount)
            .sum()
    }
}

/// Aggregated subscription costs.
///
/// Monthly subscriptions are billed every month. The `j`-th yearly
/// subscription is billed once, in month `j % 12`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    /// Sorted by monthly cost, highest first.
    pub apps: Vec<AppCost>,
    pub total_monthly: f64,
    pub total_yearly: f64,
    pub monthly_billed: f64,
    pub yearly_billed: f64,
    pub categories: Vec<CategoryCost>,
    pub schedule: Vec<MonthCharges>,
}

impl CostSummary {
    pub fn from_subscriptions(subscriptions: &[Subscription]) -> Self {
        let mut apps: Vec<AppCost> = subscriptions
            .iter()
            .map(|subscription| AppCost {
                name: subscription.name.clone(),
                category: subscription.category.clone(),
                interval: subscription.interval,
                price: subscription.price,
                monthly_cost: subscription.monthly_cost(),
            })
            .collect();
        apps.sort_by(|left, right| right.monthly_cost.total_cmp(&left.monthly_cost));

        let total_monthly: f64 = apps.iter().map(|app| app.monthly_cost).sum();

        Self {
            total_monthly,
            total_yearly: total_monthly * 12.0,
            monthly_billed: billed(subscriptions, BillingInterval::Monthly),
            yearly_billed: billed(subscriptions, BillingInterval::Yearly),
            categories: categories(subscriptions, total_monthly),
            schedule: schedule(subscriptions),
            apps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    fn count(&self, interval: BillingInterval) -> usize {
        self.apps.iter().filter(|app| app.interval == interval).count()
    }

    fn yearly_as_monthly(&self) -> f64 {
        self.yearly_billed / 12.0
    }
}

fn billed(subscriptions: &[Subscription], interval: BillingInterval) -> f64 {
    subscriptions
        .iter()
        .filter(|subscription| subscription.interval == interval)
        .map(|subscription| subscription.price)
        .sum()
}

fn categories(subscriptions: &[Subscription], total_monthly: f64) -> Vec<CategoryCost> {
    let mut categories: Vec<CategoryCost> = Vec::new();
    for subscription in subscriptions {
        let monthly = subscription.monthly_cost();
        match categories
            .iter_mut()
            .find(|category| category.name == subscription.category)
        {
            Some(category) => category.monthly_cost += monthly,
            None => categories.push(CategoryCost {
                name: subscription.category.clone(),
                monthly_cost: monthly,
                share_percent: 0.0,
            }),
        }
    }

    for category in &mut categories {
        category.share_percent = if total_monthly > 0.0 {
            category.monthly_cost / total_monthly * 100.0
        } else {
            0.0
        };
    }
    // Stable: equal costs keep first-seen order.
    categories.sort_by(|left, right| right.monthly_cost.total_cmp(&left.monthly_cost));
    categories
}

fn schedule(subscriptions: &[Subscription]) -> Vec<MonthCharges> {
    let monthly: Vec<Charge> = subscriptions
        .iter()
        .filter(|subscription| subscription.interval == BillingInterval::Monthly)
        .map(|subscription| Charge {
            name: subscription.name.clone(),
            amount: subscription.price,
            interval: BillingInterval::Monthly,
        })
        .collect();

    let mut months: Vec<MonthCharges> = MONTHS
        .iter()
        .map(|&month| MonthCharges {
            month,
            total: monthly.iter().map(|charge| charge.amount).sum(),
            charges: monthly.clone(),
        })
        .collect();

    let yearly = subscriptions
        .iter()
        .filter(|subscription| subscription.interval == BillingInterval::Yearly);
    for (index, subscription) in yearly.enumerate() {
        let month = &mut months[index % MONTHS.len()];
        month.total += subscription.price;
        month.charges.push(Charge {
            name: subscription.name.clone(),
            amount: subscription.price,
            interval: BillingInterval::Yearly,
        });
    }

    for month in &mut months {
        month.charges.sort_by(|left, right| right.amount.total_cmp(&left.amount));
    }
    months
}

/// Renders the markdown cost report written into a note.
///
/// An empty summary renders a hint naming the expected note template.
pub fn render_cost_report(summary: &CostSummary) -> String {
    if summary.is_empty() {
        return String::from(TEMPLATE_HINT);
    }

    let mut out = String::new();
    render_app_chart(&mut out, summary);
    render_categories(&mut out, summary);
    render_schedule(&mut out, summary);
    out
}

fn render_app_chart(out: &mut String, summary: &CostSummary) {
    let max_cost = summary
        .apps
        .iter()
        .map(|app| app.monthly_cost)
        .fold(0.0_f64, f64::max);

    out.push_str("## SUBSCRIPTION COSTS\n\n");
    let _ = writeln!(
        out,
        "**{} subscriptions, total:** {}/month • {}/year\n",
        summary.apps.len(),
        money(summary.total_monthly),
        money(summary.total_yearly)
    );

    for app in &summary.apps {
        let bar = "▓".repeat(cells(app.monthly_cost / max_cost, APP_BAR_CELLS));
        let link = format!("[[{}]]", app.name);
        let _ = writeln!(out, "{link:<18}|{bar}   {}", money(app.monthly_cost));
    }
    out.push_str("\n\n");
}

fn render_categories(out: &mut String, summary: &CostSummary) {
    out.push_str("## CATEGORIES\n\n");
    for (index, category) in summary.categories.iter().enumerate() {
        let icon = CATEGORY_ICONS[index % CATEGORY_ICONS.len()];
        let bar = "▒".repeat(cells(category.share_percent / 100.0, CATEGORY_BAR_CELLS));
        let cost = money(category.monthly_cost);
        let share = format!("{:.1}%", category.share_percent);
        let _ = writeln!(out, "{icon} {:<18} {cost:>8}   {share:>6} |{bar}", category.name);
    }
    out.push('\n');
}

fn render_schedule(out: &mut String, summary: &CostSummary) {
    let monthly_count = summary.count(BillingInterval::Monthly);
    let yearly_count = summary.count(BillingInterval::Yearly);

    out.push_str("## 📈 MONTHLY COSTS\n\n");
    out.push_str("**Billing overview:**\n");
    let _ = writeln!(
        out,
        "🔄 Monthly subscriptions: {monthly_count} • {}/month",
        money(summary.monthly_billed)
    );
    let _ = writeln!(
        out,
        "📅 Yearly subscriptions: {yearly_count} • {}/year ({}/month)",
        money(summary.yearly_billed),
        money(summary.yearly_as_monthly())
    );
    let _ = writeln!(
        out,
        "💰 **Total: {}/month • {}/year**\n",
        money(summary.total_monthly),
        money(summary.total_yearly)
    );

    let max_month = summary
        .schedule
        .iter()
        .map(|month| month.total)
        .fold(0.0_f64, f64::max);

    out.push_str("**12-month schedule:**\n\n");
    out.push_str("Month    Cost       Trend\n");
    let _ = writeln!(out, "{}", "═".repeat(45));
    for month in &summary.schedule {
        let bar = "█".repeat(cells(month.total / max_month, SCHEDULE_BAR_CELLS).max(1));
        let cost = format!("{:.0}€", month.total);
        let _ = writeln!(out, "{:<8} {cost:>8} |{bar}", month.month);
    }

    out.push_str("\n**📅 Charges due by month:**\n");
    let _ = writeln!(out, "{}", "═".repeat(50));
    for month in summary
        .schedule
        .iter()
        .filter(|month| !month.charges.is_empty())
    {
        let _ = writeln!(out, "\n**{} ({:.0}€):**", month.month, month.total);
        for charge in &month.charges {
            let (marker, per) = match charge.interval {
                BillingInterval::Monthly => ("🔄", "month"),
                BillingInterval::Yearly => ("📅", "year"),
            };
            let _ = writeln!(out, "  {marker} {:<20} {}/{per}", charge.name, money(charge.amount));
        }
        let yearly_total = month.yearly_total();
        if yearly_total > 0.0 {
            out.push_str("  ────────────────────────────────────\n");
            let _ = writeln!(out, "  💰 Monthly: {}", money(month.total - yearly_total));
            let _ = writeln!(out, "  💰 Yearly:  {}", money(yearly_total));
            let _ = writeln!(out, "  💰 **Total: {}**", money(month.total));
        }
    }
    out.push('\n');

    render_interval_breakdown(out, summary, BillingInterval::Monthly);
    render_interval_breakdown(out, summary, BillingInterval::Yearly);
}

fn render_interval_breakdown(out: &mut String, summary: &CostSummary, interval: BillingInterval) {
    let mut apps: Vec<&AppCost> = summary
        .apps
        .iter()
        .filter(|app| app.interval == interval)
        .collect();
    if apps.is_empty() {
        return;
    }
    apps.sort_by(|left, right| right.price.total_cmp(&left.price));
    let total: f64 = apps.iter().map(|app| app.monthly_cost).sum();

    let (heading, glyph) = match interval {
        BillingInterval::Monthly => ("🔄 Monthly subscriptions", "▓"),
        BillingInterval::Yearly => ("📅 Yearly subscriptions", "▒"),
    };
    let _ = writeln!(out, "**{heading} ({}):**", apps.len());
    for app in apps {
        let share = app.monthly_cost / total * 100.0;
        let bar = glyph.repeat(cells(share / 100.0, SHARE_BAR_CELLS).max(1));
        match interval {
            BillingInterval::Monthly => {
                let _ = writeln!(out, "  {:<15} {} |{bar} {share:.1}%", app.name, money(app.price));
            }
            BillingInterval::Yearly => {
                let _ = writeln!(
                    out,
                    "  {:<15} {}/year ({}/month) |{bar} {share:.1}%",
                    app.name,
                    money(app.price),
                    money(app.monthly_cost)
                );
            }
        }
    }
    out.push('\n');
}

fn money(value: f64) -> String {
    format!("{value:.2}€")
}

/// Bar length for `ratio` of `width` cells, rounded half up.
fn cells(ratio: f64, width: f64) -> usize {
    let scaled = (ratio * width).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(name: &str, price: f64, interval: BillingInterval, category: &str) -> Subscription {
        Subscription {
            name: name.to_owned(),
            price,
            interval,
            category: category.to_owned(),
            history: Vec::new(),
        }
    }

    fn sample() -> Vec<Subscription> {
        vec![
            subscription("Spotify", 10.0, BillingInterval::Monthly, "Music"),
            subscription("Netflix", 20.0, BillingInterval::Monthly, "Streaming"),
            subscription("Office", 120.0, BillingInterval::Yearly, "Work"),
            subscription("Disney", 60.0, BillingInterval::Yearly, "Streaming"),
        ]
    }

    #[test]
    fn apps_sorted_by_monthly_cost() {
        let summary = CostSummary::from_subscriptions(&sample());
        let names: Vec<&str> = summary.apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Netflix", "Spotify", "Office", "Disney"]);
        assert!((summary.total_monthly - 45.0).abs() < 1e-9);
        assert!((summary.total_yearly - 540.0).abs() < 1e-9);
        assert!((summary.monthly_billed - 30.0).abs() < 1e-9);
        assert!((summary.yearly_billed - 180.0).abs() < 1e-9);
    }

    #[test]
    fn categories_carry_share_and_order() {
        let summary = CostSummary::from_subscriptions(&sample());
        let streaming = &summary.categories[0];
        assert_eq!(streaming.name, "Streaming");
        assert!((streaming.monthly_cost - 25.0).abs() < 1e-9);
        assert!((streaming.share_percent - 55.555_555).abs() < 1e-3);
        let shares: f64 = summary.categories.iter().map(|c| c.share_percent).sum();
        assert!((shares - 100.0).abs() < 1e-9);
    }

    #[test]
    fn yearly_charges_land_in_rotating_months() {
        let summary = CostSummary::from_subscriptions(&sample());
        assert_eq!(summary.schedule.len(), 12);
        assert!((summary.schedule[0].total - 150.0).abs() < 1e-9);
        assert!((summary.schedule[1].total - 90.0).abs() < 1e-9);
        assert!((summary.schedule[2].total - 30.0).abs() < 1e-9);
        assert_eq!(summary.schedule[0].charges[0].name, "Office");
    }

    #[test]
    fn report_renders_every_section() {
        let report = render_cost_report(&CostSummary::from_subscriptions(&sample()));
        assert!(report.starts_with("## SUBSCRIPTION COSTS\n\n**4 subscriptions, total:** 45.00€/month • 540.00€/year"));
        assert!(report.contains(&format!("{:<18}|{}   20.00€", "[[Netflix]]", "▓".repeat(25))));
        assert!(report.contains("## CATEGORIES"));
        assert!(report.contains("📺 Streaming"));
        assert!(report.contains("**12-month schedule:**"));
        assert!(report.contains(&format!("{:<8} {:>8} |{}", "Jan", "150€", "█".repeat(30))));
        assert!(report.contains("**Jan (150€):**"));
        assert!(report.contains("**🔄 Monthly subscriptions (2):**"));
        assert!(report.contains("**📅 Yearly subscriptions (2):**"));
    }

    #[test]
    fn monthly_only_vault_still_lists_due_charges() {
        let subscriptions = vec![
            subscription("Spotify", 10.0, BillingInterval::Monthly, "Music"),
            subscription("Netflix", 20.0, BillingInterval::Monthly, "Streaming"),
        ];

        let report = render_cost_report(&CostSummary::from_subscriptions(&subscriptions));

        assert!(report.contains("**📅 Charges due by month:**"));
        assert!(report.contains("**Jan (30€):**"));
        assert!(report.contains("**Dec (30€):**"));
        assert!(report.contains(&format!("  🔄 {:<20} 20.00€/month", "Netflix")));
        assert!(!report.contains("💰 Yearly:"));
    }

    #[test]
    fn months_with_yearly_charges_get_a_split_summary() {
        let report = render_cost_report(&CostSummary::from_subscriptions(&sample()));

        assert!(report.contains("**Mar (30€):**"));
        assert!(report.contains("  💰 Yearly:  120.00€"));
        assert_eq!(report.matches("💰 Yearly:").count(), 2);
    }

    #[test]
    fn empty_summary_renders_template_hint() {
        let report = render_cost_report(&CostSummary::from_subscriptions(&[]));
        assert!(report.contains("No subscription notes found"));
        assert!(report.contains("Preis/Monat: 19.99"));
    }

    #[test]
    fn tiny_costs_still_get_one_schedule_cell() {
        let subscriptions = vec![
            subscription("Big", 1000.0, BillingInterval::Yearly, "Work"),
            subscription("Tiny", 0.5, BillingInterval::Monthly, "Misc"),
        ];
        let report = render_cost_report(&CostSummary::from_subscriptions(&subscriptions));
        let feb_zero = format!("{:<8} {:>8} |█\n", "Feb", "0€");
        let feb_one = format!("{:<8} {:>8} |█\n", "Feb", "1€");
        assert!(report.contains(&feb_zero) || report.contains(&feb_one));
    }
}
