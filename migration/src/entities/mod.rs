pub mod banner;
pub mod banner_instance;
pub mod category;
pub mod data_point;
pub mod firefox_upgrade_banner_variation;
pub mod image_banner_variation;
pub mod leaderboard_standing;
pub mod legacy_banner;
pub mod legacy_banner_image;
pub mod link;
pub mod text_banner_variation;
pub mod user;
pub mod user_profile;

pub use banner::Entity as BannerEntity;
pub use banner_instance::Entity as BannerInstanceEntity;
pub use category::Entity as CategoryEntity;
pub use data_point::Entity as DataPointEntity;
pub use firefox_upgrade_banner_variation::Entity as FirefoxUpgradeBannerVariationEntity;
pub use image_banner_variation::Entity as ImageBannerVariationEntity;
pub use leaderboard_standing::Entity as LeaderboardStandingEntity;
pub use legacy_banner::Entity as LegacyBannerEntity;
pub use legacy_banner_image::Entity as LegacyBannerImageEntity;
pub use link::Entity as LinkEntity;
pub use text_banner_variation::Entity as TextBannerVariationEntity;
pub use user::Entity as UserEntity;
pub use user_profile::Entity as UserProfileEntity;
