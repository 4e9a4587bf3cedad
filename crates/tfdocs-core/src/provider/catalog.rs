//! Bundled resource catalogs for well-known providers.
//!
//! Short names only; the provider prefix is added when identifiers are built.
//! Configured `resources` / `data_sources` extend these lists.

use crate::{ResourceIdentifier, ResourceKind};

const AWS_RESOURCES: &[&str] = &[
    "acm_certificate",
    "alb",
    "alb_listener",
    "alb_target_group",
    "ami",
    "api_gateway_rest_api",
    "apigatewayv2_api",
    "autoscaling_group",
    "cloudfront_distribution",
    "cloudwatch_log_group",
    "cloudwatch_metric_alarm",
    "db_instance",
    "db_subnet_group",
    "dynamodb_table",
    "ebs_volume",
    "ec2_instance_state",
    "ecr_repository",
    "ecs_cluster",
    "ecs_service",
    "ecs_task_definition",
    "efs_file_system",
    "eip",
    "eks_cluster",
    "eks_node_group",
    "elasticache_cluster",
    "iam_policy",
    "iam_role",
    "iam_role_policy",
    "iam_role_policy_attachment",
    "iam_user",
    "instance",
    "internet_gateway",
    "key_pair",
    "kms_key",
    "lambda_function",
    "lambda_permission",
    "launch_template",
    "lb",
    "lb_listener",
    "lb_target_group",
    "nat_gateway",
    "rds_cluster",
    "route",
    "route53_record",
    "route53_zone",
    "route_table",
    "route_table_association",
    "s3_bucket",
    "s3_bucket_policy",
    "s3_bucket_versioning",
    "s3_object",
    "secretsmanager_secret",
    "security_group",
    "security_group_rule",
    "sns_topic",
    "sns_topic_subscription",
    "spot_instance_request",
    "sqs_queue",
    "ssm_parameter",
    "subnet",
    "vpc",
    "vpc_endpoint",
    "vpc_peering_connection",
];

const AWS_DATA_SOURCES: &[&str] = &[
    "acm_certificate",
    "ami",
    "availability_zones",
    "caller_identity",
    "db_instance",
    "ecr_repository",
    "eks_cluster",
    "iam_policy",
    "iam_policy_document",
    "iam_role",
    "instance",
    "instances",
    "kms_key",
    "lambda_function",
    "partition",
    "region",
    "route53_zone",
    "s3_bucket",
    "secretsmanager_secret",
    "security_group",
    "ssm_parameter",
    "subnet",
    "subnets",
    "vpc",
];

/// Bundled `(resources, data_sources)` short names for `provider`.
pub fn bundled(provider: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match provider {
        "aws" => (AWS_RESOURCES, AWS_DATA_SOURCES),
        _ => (&[], &[]),
    }
}

/// Bundled catalog of `provider` extended with extra short names.
pub fn identifiers(
    provider: &str,
    extra_resources: &[String],
    extra_data_sources: &[String],
) -> Vec<ResourceIdentifier> {
    let (resources, data_sources) = bundled(provider);

    let resources = resources
        .iter()
        .copied()
        .chain(extra_resources.iter().map(String::as_str))
        .map(|name| ResourceIdentifier::new(provider, ResourceKind::Resource, name));
    let data_sources = data_sources
        .iter()
        .copied()
        .chain(extra_data_sources.iter().map(String::as_str))
        .map(|name| ResourceIdentifier::new(provider, ResourceKind::DataSource, name));

    let mut ids: Vec<_> = resources.chain(data_sources).collect();
    ids.sort();
    ids.dedup();
    ids
}
