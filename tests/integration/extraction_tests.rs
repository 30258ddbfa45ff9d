//! Usage extraction tests
//!
//! These tests parse real PHP sources and check which names end up in the
//! usage set.

use std::path::Path;
use vendorsweep::analysis::{UsageExtractor, UsageSet};

fn extract(source: &str) -> UsageSet {
    UsageExtractor::new()
        .extract_source(Path::new("test.php"), source)
        .expect("source should parse")
}

fn has_symbol(usage: &UsageSet, name: &str) -> bool {
    usage.used_symbols.contains(name)
}

fn has_namespace(usage: &UsageSet, name: &str) -> bool {
    usage.used_namespaces.contains(name)
}

#[test]
fn test_imports() {
    let usage = extract(
        r#"<?php
namespace App\Http\Controllers;

use Illuminate\Http\Request;
use Monolog\Logger as Log, Psr\Log\LoggerInterface;
use \GuzzleHttp\Client;
"#,
    );

    assert!(has_namespace(&usage, "Illuminate\\Http\\Request"));
    assert!(has_namespace(&usage, "Monolog\\Logger"));
    assert!(has_namespace(&usage, "Psr\\Log\\LoggerInterface"));
    assert!(has_namespace(&usage, "GuzzleHttp\\Client"));
    assert!(!has_namespace(&usage, "Log"));
}

#[test]
fn test_grouped_import() {
    let usage = extract(
        r#"<?php
use Illuminate\Support\{Str, Collection};
"#,
    );

    assert!(has_namespace(&usage, "Illuminate\\Support\\Str"));
    assert!(has_namespace(&usage, "Illuminate\\Support\\Collection"));
}

#[test]
fn test_class_references() {
    let usage = extract(
        r#"<?php
class ReportJob extends \Illuminate\Queue\Job implements ShouldQueue, \Countable
{
    use Dispatchable, \Illuminate\Bus\Queueable;

    public function handle(): void
    {
        $client = new \GuzzleHttp\Client();
        $now = \Carbon\Carbon::now();
        $level = \Monolog\Level::Debug;
        $instance = \Spatie\Once\Cache::$instance;

        if ($client instanceof \Psr\Http\Client\ClientInterface) {
            return;
        }
    }
}
"#,
    );

    for name in [
        "Illuminate\\Queue\\Job",
        "ShouldQueue",
        "Countable",
        "Dispatchable",
        "Illuminate\\Bus\\Queueable",
        "GuzzleHttp\\Client",
        "Carbon\\Carbon",
        "Monolog\\Level",
        "Spatie\\Once\\Cache",
        "Psr\\Http\\Client\\ClientInterface",
    ] {
        assert!(has_symbol(&usage, name), "missing {}", name);
    }
}

#[test]
fn test_type_hints_and_catch() {
    let usage = extract(
        r#"<?php
class Mailer
{
    private \Symfony\Component\Mailer\MailerInterface $mailer;
    private ?LoggerInterface $logger;

    public function __construct(Transport $transport, int $retries, ?Clock $clock = null)
    {
    }

    public function send(Message $message): SentMessage
    {
        try {
            return $this->mailer->send($message);
        } catch (TransportException | \RuntimeException $e) {
            throw $e;
        }
    }
}
"#,
    );

    assert!(has_symbol(&usage, "Symfony\\Component\\Mailer\\MailerInterface"));
    assert!(has_symbol(&usage, "Transport"));
    assert!(has_symbol(&usage, "Message"));
    assert!(has_symbol(&usage, "SentMessage"));
    assert!(has_symbol(&usage, "TransportException"));
    assert!(has_symbol(&usage, "RuntimeException"));

    // nullable and primitive hints are skipped
    assert!(!has_symbol(&usage, "LoggerInterface"));
    assert!(!has_symbol(&usage, "Clock"));
    assert!(!has_symbol(&usage, "int"));
}

#[test]
fn test_function_calls_and_dynamic_sites() {
    let usage = extract(
        r#"<?php
$slug = \Illuminate\Support\str_slug($title);
$x = collect([1, 2, 3]);
$obj = new $className();
$result = $className::create();
$fn = 'strlen';
$fn($slug);
"#,
    );

    assert!(has_symbol(&usage, "Illuminate\\Support\\str_slug"));
    assert!(has_symbol(&usage, "collect"));
    assert!(!has_symbol(&usage, "className"));
    assert!(!has_symbol(&usage, "strlen"));
}

#[test]
fn test_relative_scopes_are_skipped() {
    let usage = extract(
        r#"<?php
class Model extends Base
{
    public static function make(): self
    {
        self::boot();
        parent::boot();
        static::booted();
        return new self();
    }
}
"#,
    );

    assert!(has_symbol(&usage, "Base"));
    assert!(!has_symbol(&usage, "self"));
    assert!(!has_symbol(&usage, "parent"));
    assert!(!has_symbol(&usage, "static"));
}

#[test]
fn test_nested_references_are_all_found() {
    let usage = extract(
        r#"<?php
$value = Outer::wrap(helper(Inner::make(new Deepest())));
"#,
    );

    assert!(has_symbol(&usage, "Outer"));
    assert!(has_symbol(&usage, "helper"));
    assert!(has_symbol(&usage, "Inner"));
    assert!(has_symbol(&usage, "Deepest"));
}

#[test]
fn test_anonymous_class() {
    let usage = extract(
        r#"<?php
$handler = new class extends \Monolog\Handler\AbstractHandler implements \Countable {
    public function count(): int { return 0; }
};
"#,
    );

    assert!(has_symbol(&usage, "Monolog\\Handler\\AbstractHandler"));
    assert!(has_symbol(&usage, "Countable"));
}

#[test]
fn test_syntax_error_fails_the_file() {
    let result = UsageExtractor::new().extract_source(
        Path::new("broken.php"),
        "<?php\nuse Foo\\Bar;\nclass {\n",
    );
    assert!(result.is_err());
}
