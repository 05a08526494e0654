//! Embed rendering for new listings.

use {
    lookout_catalog::Item,
    serenity::builder::{
        CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage,
    },
};

pub const EMBED_COLOR: u32 = 0x00B2FF;
pub const FOOTER: &str = "Lookout • New listing";
pub const LINK_LABEL: &str = "🛍️ View listing";

/// A rendered listing: the message to send plus the headline used in logs.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub url: String,
    pub message: CreateMessage,
}

pub fn render(item: &Item) -> Notification {
    let seller = item.seller.login.as_deref().unwrap_or("Unknown seller");
    let seller_kind = if item.seller.business {
        "👔 Pro"
    } else {
        "🧑 Private seller"
    };
    let brand = item.brand.as_deref().unwrap_or("N/A");
    let size = item.size_label().unwrap_or("Not specified");
    let price = item
        .price
        .as_ref()
        .map(|p| format!("{} {}", p.amount, p.currency_code))
        .unwrap_or_else(|| "N/A".into());
    let title = item.title.clone().unwrap_or_else(|| "New listing".into());

    let mut embed = CreateEmbed::new()
        .title(&title)
        .url(&item.url)
        .description(format!(
            "👤 **{seller}**\n{seller_kind}\n👟 {brand} | 📏 Size: {size}"
        ))
        .colour(EMBED_COLOR)
        .field(
            "🛍️ Condition",
            item.status.as_deref().unwrap_or("N/A"),
            true,
        )
        .field("💸 Price", price, true)
        .footer(CreateEmbedFooter::new(FOOTER));
    if let Some(url) = item.image_urls().first() {
        embed = embed.image(*url);
    }

    let button = CreateButton::new_link(&item.url).label(LINK_LABEL);
    let message = CreateMessage::new()
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(vec![button])]);

    Notification {
        title,
        url: item.url.clone(),
        message,
    }
}
