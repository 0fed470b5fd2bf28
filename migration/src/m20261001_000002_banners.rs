//! 横幅相关表
//!
//! - categories: 树形分类
//! - banners: 三类横幅共用
//! - *_variations: 各类横幅的颜色/语言变体

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Category::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Category::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Category::ParentId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_parent")
                            .from(Category::Table, Category::ParentId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Banner::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Banner::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Banner::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Banner::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Banner::CategoryId).big_integer().not_null())
                    .col(ColumnDef::new(Banner::Destination).text().not_null())
                    .col(
                        ColumnDef::new(Banner::Visible)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Banner::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Banner::Modified)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_banners_category")
                            .from(Banner::Table, Banner::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_banners_kind_category")
                    .table(Banner::Table)
                    .col(Banner::Kind)
                    .col(Banner::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ImageBannerVariation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImageBannerVariation::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ImageBannerVariation::BannerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ImageBannerVariation::Color)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ImageBannerVariation::Locale)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ImageBannerVariation::Image)
                            .string_len(255)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_image_variations_banner")
                            .from(ImageBannerVariation::Table, ImageBannerVariation::BannerId)
                            .to(Banner::Table, Banner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TextBannerVariation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TextBannerVariation::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TextBannerVariation::BannerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TextBannerVariation::Locale)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TextBannerVariation::Text).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_text_variations_banner")
                            .from(TextBannerVariation::Table, TextBannerVariation::BannerId)
                            .to(Banner::Table, Banner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FirefoxUpgradeBannerVariation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FirefoxUpgradeBannerVariation::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FirefoxUpgradeBannerVariation::BannerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FirefoxUpgradeBannerVariation::Color)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FirefoxUpgradeBannerVariation::Locale)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FirefoxUpgradeBannerVariation::Image)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FirefoxUpgradeBannerVariation::UpgradeImage)
                            .string_len(255)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_upgrade_variations_banner")
                            .from(
                                FirefoxUpgradeBannerVariation::Table,
                                FirefoxUpgradeBannerVariation::BannerId,
                            )
                            .to(Banner::Table, Banner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(FirefoxUpgradeBannerVariation::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TextBannerVariation::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ImageBannerVariation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_banners_kind_category").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Banner::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Category {
    #[sea_orm(iden = "categories")]
    Table,
    Id,
    Name,
    ParentId,
}

#[derive(DeriveIden)]
pub(crate) enum Banner {
    #[sea_orm(iden = "banners")]
    Table,
    Id,
    Kind,
    Name,
    CategoryId,
    Destination,
    Visible,
    Created,
    Modified,
}

#[derive(DeriveIden)]
enum ImageBannerVariation {
    #[sea_orm(iden = "image_banner_variations")]
    Table,
    Id,
    BannerId,
    Color,
    Locale,
    Image,
}

#[derive(DeriveIden)]
enum TextBannerVariation {
    #[sea_orm(iden = "text_banner_variations")]
    Table,
    Id,
    BannerId,
    Locale,
    Text,
}

#[derive(DeriveIden)]
enum FirefoxUpgradeBannerVariation {
    #[sea_orm(iden = "firefox_upgrade_banner_variations")]
    Table,
    Id,
    BannerId,
    Color,
    Locale,
    Image,
    UpgradeImage,
}
