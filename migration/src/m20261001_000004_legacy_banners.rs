//! 旧版推广计划（v1）遗留表
//!
//! 旧链接仍在外部站点上流通，保留这些表以支持跳转和计数。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LegacyBanner::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LegacyBanner::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LegacyBanner::Name).string_len(255).not_null())
                    .col(ColumnDef::new(LegacyBanner::Href).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LegacyBannerImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LegacyBannerImage::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LegacyBannerImage::BannerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LegacyBannerImage::Color)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LegacyBannerImage::Locale)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LegacyBannerImage::Image)
                            .string_len(255)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_legacy_images_banner")
                            .from(LegacyBannerImage::Table, LegacyBannerImage::BannerId)
                            .to(LegacyBanner::Table, LegacyBanner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BannerInstance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BannerInstance::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BannerInstance::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BannerInstance::BadgeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BannerInstance::ImageId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BannerInstance::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BannerInstance::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：同一用户的同一横幅+图片组合只保留一个实例
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_banner_instances_user_badge_image")
                    .table(BannerInstance::Table)
                    .col(BannerInstance::UserId)
                    .col(BannerInstance::BadgeId)
                    .col(BannerInstance::ImageId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BannerInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LegacyBannerImage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LegacyBanner::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LegacyBanner {
    #[sea_orm(iden = "legacy_banners")]
    Table,
    Id,
    Name,
    Href,
}

#[derive(DeriveIden)]
enum LegacyBannerImage {
    #[sea_orm(iden = "legacy_banner_images")]
    Table,
    Id,
    BannerId,
    Color,
    Locale,
    Image,
}

#[derive(DeriveIden)]
enum BannerInstance {
    #[sea_orm(iden = "banner_instances")]
    Table,
    Id,
    UserId,
    BadgeId,
    ImageId,
    Clicks,
    Created,
}
