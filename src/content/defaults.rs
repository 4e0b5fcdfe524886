//! Initial content: empty listings used as the base of a create, and the
//! seed content of the singleton pages.

use chrono::{DateTime, Utc};

use crate::db::models::*;
use crate::db::sections::*;

pub fn blank_destination(now: DateTime<Utc>) -> Destination {
    Destination {
        id: 0,
        name: String::new(),
        slug: String::new(),
        region: String::new(),
        category: DestinationCategory::default(),
        hero_image: String::new(),
        hero_image_public_id: None,
        overview: Overview::default(),
        history_and_legend: HistoryAndLegend::default(),
        where_is_located: WhereIsLocated::default(),
        how_to_go: HowToGo::default(),
        what_to_see: WhatToSee::default(),
        best_time_to_visit: BestTimeToVisit::default(),
        things_to_do: ThingsToDo::default(),
        where_to_stay: WhereToStay::default(),
        where_to_eat: WhereToEat::default(),
        travel_tips: TravelTips::default(),
        nearby_destinations: NearbyDestinations::default(),
        meta_description: None,
        keywords: Vec::new(),
        status: PublishStatus::Draft,
        published_date: None,
        completeness: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn blank_hotel(now: DateTime<Utc>) -> Hotel {
    Hotel {
        id: 0,
        name: String::new(),
        slug: String::new(),
        category: HotelCategory::default(),
        price: None,
        currency: "USD".to_string(),
        hero_image: String::new(),
        hero_image_public_id: None,
        photo_gallery: Gallery::default(),
        quick_summary: String::new(),
        full_description: String::new(),
        amenities: Vec::new(),
        location: Location::default(),
        contact: JsonObject::new(),
        nearby_destinations: Vec::new(),
        rating: 0.0,
        review_count: 0,
        meta_description: None,
        keywords: Vec::new(),
        status: PublishStatus::Draft,
        published_date: None,
        completeness: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn blank_restaurant(now: DateTime<Utc>) -> Restaurant {
    Restaurant {
        id: 0,
        name: String::new(),
        slug: String::new(),
        cuisine: String::new(),
        price: None,
        price_range: None,
        currency: "USD".to_string(),
        specialty: String::new(),
        hero_image: String::new(),
        hero_image_public_id: None,
        photo_gallery: Gallery::default(),
        quick_summary: String::new(),
        full_description: String::new(),
        menu_highlights: Vec::new(),
        hours: JsonObject::new(),
        location: Location::default(),
        contact: JsonObject::new(),
        nearby_destinations: Vec::new(),
        rating: 0.0,
        review_count: 0,
        meta_description: None,
        keywords: Vec::new(),
        status: PublishStatus::Draft,
        published_date: None,
        completeness: 0,
        created_at: now,
        updated_at: now,
    }
}

fn stat(icon: &str, value: &str, label: &str) -> Stat {
    Stat {
        icon: icon.into(),
        value: value.into(),
        label: label.into(),
    }
}

fn company_value(icon: &str, title: &str, description: &str) -> CompanyValue {
    CompanyValue {
        icon: icon.into(),
        title: title.into(),
        description: description.into(),
    }
}

fn member(name: &str, role: &str, bio: &str) -> TeamMember {
    TeamMember {
        name: name.into(),
        role: role.into(),
        bio: bio.into(),
        ..TeamMember::default()
    }
}

pub fn about_page(now: DateTime<Utc>) -> AboutPage {
    AboutPage {
        id: 1,
        header_image: String::new(),
        header_image_public_id: None,
        stats: vec![
            stat("🏖️", "1,340km", "Coastline"),
            stat("🌴", "26", "National Parks"),
            stat("🏛️", "8", "UNESCO Sites"),
            stat("📸", "500+", "Photo Spots"),
        ],
        story_title: "Our Story".into(),
        story_paragraph1: "AboutSL was born from a simple passion: to share the incredible beauty, \
            rich culture, and warm hospitality of Sri Lanka with travelers from around the world. \
            What started as a personal travel blog has grown into a comprehensive tourism platform \
            trusted by thousands of visitors every year."
            .into(),
        story_paragraph2: "Sri Lanka, often called the \"Pearl of the Indian Ocean,\" packs an \
            incredible diversity of experiences into a compact island. From the ancient rock \
            fortress of Sigiriya to the misty tea plantations of Nuwara Eliya, from thrilling \
            wildlife safaris in Yala to the colonial charm of Galle Fort, there's something \
            magical waiting around every corner."
            .into(),
        story_paragraph3: "Our mission is to make it easy for travelers to discover these hidden \
            treasures. We carefully curate every destination, hotel, and restaurant on our \
            platform, ensuring you get authentic, high-quality experiences that showcase the best \
            of Sri Lanka."
            .into(),
        values: vec![
            company_value(
                "Heart",
                "Passion",
                "We love Sri Lanka and want to share its beauty with the world",
            ),
            company_value(
                "Shield",
                "Trust",
                "All recommendations are verified and quality-assured",
            ),
            company_value(
                "Globe",
                "Sustainability",
                "Promoting responsible and eco-friendly tourism",
            ),
            company_value(
                "Sparkles",
                "Excellence",
                "Curating only the best experiences for travelers",
            ),
        ],
        team_members: vec![
            member(
                "ABC",
                "Founder & CEO",
                "Travel enthusiast with 15+ years exploring Sri Lanka",
            ),
            member("B", "Content Director", ""),
            member("C", "Head of Partnerships", ""),
        ],
        created_at: now,
        updated_at: now,
    }
}

pub fn contact_page(now: DateTime<Utc>) -> ContactPage {
    let hours = |day: &str, time: &str| BusinessHours {
        day: day.into(),
        time: time.into(),
    };
    ContactPage {
        id: 1,
        header_image: String::new(),
        header_image_public_id: None,
        email: vec!["hello@aboutsl.com".into(), "support@aboutsl.com".into()],
        phone: vec!["+94 11 234 5678".into(), "+94 77 123 4567".into()],
        address: vec!["42 Galle Road, Colombo 03".into(), "Sri Lanka".into()],
        whatsapp: "+94 77 123 4567".into(),
        facebook: String::new(),
        instagram: String::new(),
        twitter: String::new(),
        business_hours: vec![
            hours("Monday - Friday", "9:00 AM - 6:00 PM"),
            hours("Saturday", "10:00 AM - 4:00 PM"),
            hours("Sunday", "Closed"),
        ],
        timezone: "Sri Lanka Standard Time (UTC +5:30)".into(),
        created_at: now,
        updated_at: now,
    }
}
