use dioxus::prelude::*;

use crate::domain::Availability;

#[component]
pub fn AvailabilityBadge(availability: Availability) -> Element {
    let color = match availability {
        Availability::WellPriced => "badge-ok",
        Availability::Missing => "badge-bad",
        Availability::Other(_) => "badge-other",
    };
    let label = availability.display_name().to_string();

    rsx! {
        span { class: "badge {color}", "{label}" }
    }
}
